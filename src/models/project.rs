use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, double_option, validate_progress, validate_title};
use crate::error::AppError;

pub mod status {
    pub const DRAFT: &str = "draft";
    pub const SUBMITTED: &str = "submitted";
    pub const REVIEWING: &str = "reviewing";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";
    pub const IN_PROGRESS: &str = "in_progress";
    pub const COMPLETED: &str = "completed";
    pub const ARCHIVED: &str = "archived";

    pub const ALL: &[&str] = &[
        DRAFT, SUBMITTED, REVIEWING, APPROVED, REJECTED, IN_PROGRESS, COMPLETED, ARCHIVED,
    ];
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    /// Key of an active entry in the project type catalog.
    pub project_type: String,
    /// Advisor for the project. Defaults to the student's bound advisor.
    pub teacher_id: Option<i32>,
    pub plan: Option<String>,
}

pub fn validate_create_project(payload: &CreateProjectRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    Ok(())
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub plan: Option<Option<String>>,
}

pub fn validate_update_project(payload: &UpdateProjectRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title)?;
    }
    if let Some(ref description) = payload.description
        && description.trim().is_empty()
    {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReviewProjectRequest {
    /// `approved`, `rejected`, or `reviewing` (park without a verdict).
    pub verdict: String,
    pub comments: Option<String>,
}

pub fn validate_review_project(payload: &ReviewProjectRequest) -> Result<(), AppError> {
    match payload.verdict.as_str() {
        "approved" | "reviewing" => Ok(()),
        "rejected" => {
            if payload
                .comments
                .as_deref()
                .is_none_or(|c| c.trim().is_empty())
            {
                return Err(AppError::Validation(
                    "Rejection requires review comments".into(),
                ));
            }
            Ok(())
        }
        _ => Err(AppError::Validation(
            "Verdict must be one of: approved, rejected, reviewing".into(),
        )),
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ForceStatusRequest {
    pub status: String,
    /// Audit reason, required for force transitions.
    pub reason: String,
}

pub fn validate_force_status(payload: &ForceStatusRequest) -> Result<(), AppError> {
    if !status::ALL.contains(&payload.status.as_str()) {
        return Err(AppError::Validation(format!(
            "status must be one of: {}",
            status::ALL.join(", ")
        )));
    }
    if payload.reason.trim().is_empty() {
        return Err(AppError::Validation(
            "A reason is required for force transitions".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateProgressRequest {
    /// 0-100. Reaching 100 completes the project.
    pub progress: i32,
}

pub fn validate_update_progress(payload: &UpdateProgressRequest) -> Result<(), AppError> {
    validate_progress(payload.progress)
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProjectListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub project_type: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub project_type: String,
    pub student_id: i32,
    pub teacher_id: i32,
    pub status: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub plan: Option<String>,
    pub progress: i32,
    pub finish_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::project::Model> for ProjectResponse {
    fn from(m: crate::entity::project::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            project_type: m.project_type,
            student_id: m.student_id,
            teacher_id: m.teacher_id,
            status: m.status,
            submitted_at: m.submitted_at,
            approved_at: m.approved_at,
            rejection_reason: m.rejection_reason,
            plan: m.plan,
            progress: m.progress,
            finish_time: m.finish_time,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct ProjectListItem {
    pub id: i32,
    pub title: String,
    pub project_type: String,
    pub student_id: i32,
    pub teacher_id: i32,
    pub status: String,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectListResponse {
    pub data: Vec<ProjectListItem>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectReviewItem {
    pub id: i32,
    pub reviewer_id: i32,
    pub verdict: String,
    pub comments: Option<String>,
    pub is_force: bool,
    pub reviewed_at: DateTime<Utc>,
}

impl From<crate::entity::project_review::Model> for ProjectReviewItem {
    fn from(m: crate::entity::project_review::Model) -> Self {
        Self {
            id: m.id,
            reviewer_id: m.reviewer_id,
            verdict: m.verdict,
            comments: m.comments,
            is_force: m.is_force,
            reviewed_at: m.reviewed_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StatusHistoryItem {
    pub id: i32,
    pub old_status: String,
    pub new_status: String,
    pub change_reason: Option<String>,
    pub changed_by: i32,
    pub changed_at: DateTime<Utc>,
}

impl From<crate::entity::project_status_history::Model> for StatusHistoryItem {
    fn from(m: crate::entity::project_status_history::Model) -> Self {
        Self {
            id: m.id,
            old_status: m.old_status,
            new_status: m.new_status,
            change_reason: m.change_reason,
            changed_by: m.changed_by,
            changed_at: m.changed_at,
        }
    }
}

/// Full project view with participants, files, and review history.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub student_username: String,
    pub teacher_username: String,
    pub files: Vec<super::file::ProjectFileResponse>,
    pub reviews: Vec<ProjectReviewItem>,
}

/// Aggregate counts for the admin project dashboard.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectStatsResponse {
    pub total: u64,
    pub by_status: std::collections::BTreeMap<String, u64>,
    pub by_type: std::collections::BTreeMap<String, u64>,
}
