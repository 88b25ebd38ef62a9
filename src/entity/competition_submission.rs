use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition_submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub competition_id: i32,
    #[sea_orm(belongs_to, from = "competition_id", to = "id")]
    pub competition: BelongsTo<super::competition::Entity>,

    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: BelongsTo<super::user::Entity>,

    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub description: Option<String>,

    /// Monotonic per (competition, student); starts at 1.
    pub version: i32,

    /// `submitted`, `reviewing`, `approved`, or `rejected`.
    pub status: String,
    /// Locked submissions reject further versions and edits.
    pub locked: bool,

    #[sea_orm(has_many)]
    pub scores: HasMany<super::competition_score::Entity>,

    pub submitted_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
