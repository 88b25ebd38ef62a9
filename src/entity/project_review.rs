use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit row for every review verdict on a project.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub project_id: i32,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: BelongsTo<super::project::Entity>,

    pub reviewer_id: i32,
    /// `approved`, `rejected`, or `archived`.
    pub verdict: String,
    pub comments: Option<String>,
    /// Set when the verdict came from an admin force-transition.
    pub is_force: bool,
    pub reviewed_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
