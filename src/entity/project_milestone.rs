use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_milestone")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub project_id: i32,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: BelongsTo<super::project::Entity>,

    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTimeUtc,
    pub completed_date: Option<DateTimeUtc>,
    /// `pending`, `completed`, or `overdue`.
    pub status: String,
    /// Completion percentage, 0-100. Reaching 100 marks the milestone completed.
    pub progress: i32,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
