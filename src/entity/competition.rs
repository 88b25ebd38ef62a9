use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub description: String,
    /// `school`, `provincial`, `national`, or `international`.
    pub level: String,
    pub category: Option<String>,

    pub registration_start: DateTimeUtc,
    pub registration_end: DateTimeUtc,
    pub submission_start: DateTimeUtc,
    pub submission_end: DateTimeUtc,

    /// 0 means unlimited.
    pub max_participants: i32,
    pub current_participants: i32,
    pub is_open: bool,

    /// One of: draft, registration, submission, review, completed
    pub status: String,

    pub created_by: i32,

    #[sea_orm(has_many)]
    pub registrations: HasMany<super::competition_registration::Entity>,
    #[sea_orm(has_many)]
    pub submissions: HasMany<super::competition_submission::Entity>,
    #[sea_orm(has_many)]
    pub judges: HasMany<super::competition_judge::Entity>,
    #[sea_orm(has_many)]
    pub results: HasMany<super::competition_result::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
