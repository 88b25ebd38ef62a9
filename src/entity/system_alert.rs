use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_alert")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub alert_type: String,
    /// `info`, `warning`, or `critical`.
    pub severity: String,
    pub title: String,
    pub message: String,

    /// Lifecycle: active -> acknowledged -> resolved (or active -> resolved).
    pub status: String,
    pub acknowledged_by: Option<i32>,
    pub acknowledged_at: Option<DateTimeUtc>,
    pub resolved_by: Option<i32>,
    pub resolved_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
