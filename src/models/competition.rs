use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_title};
use crate::error::AppError;

pub mod status {
    pub const DRAFT: &str = "draft";
    pub const REGISTRATION: &str = "registration";
    pub const SUBMISSION: &str = "submission";
    pub const REVIEW: &str = "review";
    pub const COMPLETED: &str = "completed";

    pub const ALL: &[&str] = &[DRAFT, REGISTRATION, SUBMISSION, REVIEW, COMPLETED];
}

pub const LEVELS: &[&str] = &["school", "provincial", "national", "international"];

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCompetitionRequest {
    pub title: String,
    pub description: String,
    /// One of: school, provincial, national, international
    pub level: String,
    pub category: Option<String>,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub submission_start: DateTime<Utc>,
    pub submission_end: DateTime<Utc>,
    /// 0 means unlimited.
    pub max_participants: Option<i32>,
}

pub fn validate_create_competition(payload: &CreateCompetitionRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if !LEVELS.contains(&payload.level.as_str()) {
        return Err(AppError::Validation(format!(
            "level must be one of: {}",
            LEVELS.join(", ")
        )));
    }
    if payload.registration_end <= payload.registration_start {
        return Err(AppError::Validation(
            "registration_end must be after registration_start".into(),
        ));
    }
    if payload.submission_end <= payload.submission_start {
        return Err(AppError::Validation(
            "submission_end must be after submission_start".into(),
        ));
    }
    if payload.submission_start < payload.registration_start {
        return Err(AppError::Validation(
            "submission_start must not precede registration_start".into(),
        ));
    }
    if let Some(max) = payload.max_participants
        && max < 0
    {
        return Err(AppError::Validation(
            "max_participants must be >= 0".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCompetitionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub submission_start: Option<DateTime<Utc>>,
    pub submission_end: Option<DateTime<Utc>>,
    pub max_participants: Option<i32>,
    pub status: Option<String>,
}

pub fn validate_update_competition(payload: &UpdateCompetitionRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title)?;
    }
    if let Some(ref level) = payload.level
        && !LEVELS.contains(&level.as_str())
    {
        return Err(AppError::Validation(format!(
            "level must be one of: {}",
            LEVELS.join(", ")
        )));
    }
    if let Some(ref status) = payload.status
        && !status::ALL.contains(&status.as_str())
    {
        return Err(AppError::Validation(format!(
            "status must be one of: {}",
            status::ALL.join(", ")
        )));
    }
    if let Some(max) = payload.max_participants
        && max < 0
    {
        return Err(AppError::Validation(
            "max_participants must be >= 0".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CompetitionListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub level: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub level: String,
    pub category: Option<String>,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub submission_start: DateTime<Utc>,
    pub submission_end: DateTime<Utc>,
    pub max_participants: i32,
    pub current_participants: i32,
    pub is_open: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::competition::Model> for CompetitionResponse {
    fn from(m: crate::entity::competition::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            level: m.level,
            category: m.category,
            registration_start: m.registration_start,
            registration_end: m.registration_end,
            submission_start: m.submission_start,
            submission_end: m.submission_end,
            max_participants: m.max_participants,
            current_participants: m.current_participants,
            is_open: m.is_open,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct CompetitionListItem {
    pub id: i32,
    pub title: String,
    pub level: String,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub submission_end: DateTime<Utc>,
    pub max_participants: i32,
    pub current_participants: i32,
    pub is_open: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionListResponse {
    pub data: Vec<CompetitionListItem>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionDetailResponse {
    #[serde(flatten)]
    pub competition: CompetitionResponse,
    pub registration_count: u64,
    pub submission_count: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionStatsResponse {
    pub total: u64,
    pub open: u64,
    pub by_status: std::collections::BTreeMap<String, u64>,
    pub by_level: std::collections::BTreeMap<String, u64>,
}
