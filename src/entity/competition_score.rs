use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One judge's score for one submission. Re-scoring updates in place.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition_score")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub submission_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub judge_id: i32,
    #[sea_orm(belongs_to, from = "submission_id", to = "id")]
    pub submission: BelongsTo<super::competition_submission::Entity>,
    #[sea_orm(belongs_to, from = "judge_id", to = "id")]
    pub judge: BelongsTo<super::user::Entity>,

    /// 0-100.
    pub score: f64,
    pub comment: Option<String>,
    pub scored_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
