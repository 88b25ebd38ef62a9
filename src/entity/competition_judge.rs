use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Teacher assigned to score submissions for a competition.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition_judge")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub competition_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub teacher_id: i32,
    #[sea_orm(belongs_to, from = "competition_id", to = "id")]
    pub competition: BelongsTo<super::competition::Entity>,
    #[sea_orm(belongs_to, from = "teacher_id", to = "id")]
    pub teacher: BelongsTo<super::user::Entity>,

    /// `active` or `inactive`. Only active judges may score.
    pub status: String,
    pub assigned_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
