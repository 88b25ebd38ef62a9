use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deadline extension application for a project.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_extension")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub project_id: i32,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: BelongsTo<super::project::Entity>,

    pub applicant_id: i32,
    pub reason: String,
    pub original_end_date: Option<DateTimeUtc>,
    pub requested_end_date: DateTimeUtc,

    /// `pending`, `approved`, or `rejected`.
    pub status: String,
    pub reviewer_id: Option<i32>,
    pub review_comments: Option<String>,
    pub reviewed_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
