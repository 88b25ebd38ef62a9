use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub project_id: i32,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: BelongsTo<super::project::Entity>,

    pub file_name: String,
    /// Location on local disk under the uploads directory.
    pub file_path: String,
    /// `proposal`, `midterm`, `final`, `achievement`, or `other`.
    pub file_type: String,
    pub file_version: i32,
    pub file_size: i64,

    /// `pending`, `approved`, or `rejected`.
    pub review_status: String,
    pub review_comments: Option<String>,
    pub reviewed_by: Option<i32>,
    pub reviewed_at: Option<DateTimeUtc>,

    pub is_public: bool,
    pub uploaded_by: i32,
    pub uploaded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
