use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub competition_id: i32,
    #[sea_orm(belongs_to, from = "competition_id", to = "id")]
    pub competition: BelongsTo<super::competition::Entity>,

    pub student_id: i32,
    pub submission_id: i32,

    /// e.g. `first_prize`, `second_prize`, `third_prize`, `honorable_mention`.
    pub award_level: String,
    pub final_score: Option<f64>,
    pub certificate_url: Option<String>,

    pub created_by: i32,
    pub finalized_by: Option<i32>,
    pub finalized_at: Option<DateTimeUtc>,
    pub published_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
