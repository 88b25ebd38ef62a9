use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: String,
    /// Key of a `project_type` catalog entry (e.g. "innovation", "lab").
    pub project_type: String,

    pub student_id: i32,
    #[sea_orm(belongs_to, relation_enum = "Student", from = "student_id", to = "id")]
    pub student: BelongsTo<super::user::Entity>,

    pub teacher_id: i32,
    #[sea_orm(belongs_to, relation_enum = "Teacher", from = "teacher_id", to = "id")]
    pub teacher: BelongsTo<super::user::Entity>,

    /// One of:
    /// draft, submitted, reviewing, approved, rejected,
    /// in_progress, completed, archived
    pub status: String,

    pub submitted_at: Option<DateTimeUtc>,
    pub approved_at: Option<DateTimeUtc>,
    pub approved_by: Option<i32>,
    pub rejection_reason: Option<String>,

    /// Research plan, editable while the project is a draft.
    pub plan: Option<String>,
    /// Completion percentage, 0-100.
    pub progress: i32,
    pub finish_time: Option<DateTimeUtc>,

    /// Soft-delete flag. Deleted projects are hidden from non-admins.
    pub deleted: bool,

    #[sea_orm(has_many)]
    pub reviews: HasMany<super::project_review::Entity>,
    #[sea_orm(has_many)]
    pub milestones: HasMany<super::project_milestone::Entity>,
    #[sea_orm(has_many)]
    pub files: HasMany<super::project_file::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
