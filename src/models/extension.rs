use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateExtensionRequest {
    pub reason: String,
    pub requested_end_date: DateTime<Utc>,
    pub original_end_date: Option<DateTime<Utc>>,
}

pub fn validate_create_extension(payload: &CreateExtensionRequest) -> Result<(), AppError> {
    if payload.reason.trim().is_empty() {
        return Err(AppError::Validation("Reason must not be empty".into()));
    }
    if let Some(original) = payload.original_end_date
        && payload.requested_end_date <= original
    {
        return Err(AppError::Validation(
            "requested_end_date must be after the original end date".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReviewExtensionRequest {
    /// `approved` or `rejected`.
    pub verdict: String,
    pub comments: Option<String>,
}

pub fn validate_review_extension(payload: &ReviewExtensionRequest) -> Result<(), AppError> {
    match payload.verdict.as_str() {
        "approved" | "rejected" => Ok(()),
        _ => Err(AppError::Validation(
            "Verdict must be `approved` or `rejected`".into(),
        )),
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ExtensionResponse {
    pub id: i32,
    pub project_id: i32,
    pub applicant_id: i32,
    pub reason: String,
    pub original_end_date: Option<DateTime<Utc>>,
    pub requested_end_date: DateTime<Utc>,
    pub status: String,
    pub reviewer_id: Option<i32>,
    pub review_comments: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::project_extension::Model> for ExtensionResponse {
    fn from(m: crate::entity::project_extension::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            applicant_id: m.applicant_id,
            reason: m.reason,
            original_end_date: m.original_end_date,
            requested_end_date: m.requested_end_date,
            status: m.status,
            reviewer_id: m.reviewer_id,
            review_comments: m.review_comments,
            reviewed_at: m.reviewed_at,
            created_at: m.created_at,
        }
    }
}
