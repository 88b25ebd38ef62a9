use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog of project categories. Projects reference an entry by `key`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_type")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stable identifier used in `project.project_type`.
    #[sea_orm(unique)]
    pub key: String,
    pub name: String,
    pub description: Option<String>,

    /// Parent category for one level of nesting; None for top-level entries.
    pub parent_id: Option<i32>,
    pub sort_order: i32,
    /// Inactive entries are kept for existing projects but rejected on new ones.
    pub is_active: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
