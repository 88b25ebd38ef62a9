use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_health_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<f64>,
    pub disk_usage: Option<f64>,

    /// `up` or `down`.
    pub db_status: String,
    pub response_time_ms: i64,

    /// `healthy`, `degraded`, or `unhealthy`.
    pub status: String,
    pub recorded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
