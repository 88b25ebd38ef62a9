use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::double_option;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProjectTypeRequest {
    /// Stable key referenced by projects, e.g. `innovation`.
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    /// Parent catalog entry for one level of nesting.
    pub parent_id: Option<i32>,
    pub sort_order: Option<i32>,
}

pub fn validate_create_project_type(payload: &CreateProjectTypeRequest) -> Result<(), AppError> {
    validate_type_key(&payload.key)?;
    validate_type_name(&payload.name)?;
    Ok(())
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateProjectTypeRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

pub fn validate_update_project_type(payload: &UpdateProjectTypeRequest) -> Result<(), AppError> {
    if let Some(ref name) = payload.name {
        validate_type_name(name)?;
    }
    Ok(())
}

fn validate_type_key(key: &str) -> Result<(), AppError> {
    let len = key.chars().count();
    if len == 0 || len > 64 {
        return Err(AppError::Validation("Key must be 1-64 characters".into()));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(AppError::Validation(
            "Key may contain only lowercase letters, digits, '_' and '-'".into(),
        ));
    }
    Ok(())
}

fn validate_type_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 100 {
        return Err(AppError::Validation("Name must be 1-100 characters".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectTypeResponse {
    pub id: i32,
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    pub sort_order: i32,
    pub is_active: bool,
    /// Number of non-deleted projects referencing this entry.
    pub project_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectTypeResponse {
    pub fn new(m: crate::entity::project_type::Model, project_count: u64) -> Self {
        Self {
            id: m.id,
            key: m.key,
            name: m.name,
            description: m.description,
            parent_id: m.parent_id,
            sort_order: m.sort_order,
            is_active: m.is_active,
            project_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Top-level catalog entry with its children nested one level deep.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectTypeTreeItem {
    #[serde(flatten)]
    pub entry: ProjectTypeResponse,
    pub children: Vec<ProjectTypeResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectTypeStatsItem {
    pub id: i32,
    pub key: String,
    pub name: String,
    pub project_count: u64,
}
