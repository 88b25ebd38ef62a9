use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "competition_registration")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub competition_id: i32,
    #[sea_orm(belongs_to, from = "competition_id", to = "id")]
    pub competition: BelongsTo<super::competition::Entity>,

    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: BelongsTo<super::user::Entity>,

    pub team_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,

    /// `registered`, `approved`, `rejected`, or `withdrawn`.
    pub status: String,

    /// Advisor sign-off: `pending`, `approved`, or `rejected`.
    pub teacher_review_status: String,
    pub teacher_review_comment: Option<String>,
    pub teacher_review_time: Option<DateTimeUtc>,

    pub registered_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
