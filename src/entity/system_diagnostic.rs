use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One diagnostics run. Inserted as `running`, completed by a background task.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_diagnostic")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub check_type: String,
    /// `running`, `passed`, or `failed`.
    pub status: String,
    /// Per-check results stored as a JSON object.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub details: Option<serde_json::Value>,

    pub started_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
