use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Subsystem that produced the entry, e.g. `auth`, `project`, `competition`.
    pub source: String,
    pub message: String,

    pub user_id: Option<i32>,
    pub ip_address: Option<String>,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
