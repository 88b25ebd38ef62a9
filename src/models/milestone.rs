use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{validate_progress, validate_title};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMilestoneRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
}

pub fn validate_create_milestone(payload: &CreateMilestoneRequest) -> Result<(), AppError> {
    validate_title(&payload.title)
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateMilestoneRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    /// 0-100. Reaching 100 marks the milestone completed.
    pub progress: Option<i32>,
}

pub fn validate_update_milestone(payload: &UpdateMilestoneRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title)?;
    }
    if let Some(progress) = payload.progress {
        validate_progress(progress)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MilestoneResponse {
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
    pub status: String,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::project_milestone::Model> for MilestoneResponse {
    fn from(m: crate::entity::project_milestone::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            title: m.title,
            description: m.description,
            due_date: m.due_date,
            completed_date: m.completed_date,
            status: m.status,
            progress: m.progress,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
