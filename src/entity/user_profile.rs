use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: BelongsTo<super::user::Entity>,

    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub student_no: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    /// Research interests stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub interests: Option<serde_json::Value>,
    pub last_login: Option<DateTimeUtc>,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
