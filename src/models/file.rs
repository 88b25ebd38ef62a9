use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const FILE_TYPES: &[&str] = &["proposal", "midterm", "final", "achievement", "other"];

pub fn validate_file_type(file_type: &str) -> Result<(), AppError> {
    if FILE_TYPES.contains(&file_type) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "file_type must be one of: {}",
            FILE_TYPES.join(", ")
        )))
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReviewFileRequest {
    /// `approved` or `rejected`.
    pub verdict: String,
    pub comments: Option<String>,
}

pub fn validate_review_file(payload: &ReviewFileRequest) -> Result<(), AppError> {
    match payload.verdict.as_str() {
        "approved" | "rejected" => Ok(()),
        _ => Err(AppError::Validation(
            "Verdict must be `approved` or `rejected`".into(),
        )),
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectFileResponse {
    pub id: i32,
    pub project_id: i32,
    pub file_name: String,
    pub file_type: String,
    pub file_version: i32,
    pub file_size: i64,
    pub review_status: String,
    pub review_comments: Option<String>,
    pub reviewed_by: Option<i32>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub is_public: bool,
    pub uploaded_by: i32,
    pub uploaded_at: DateTime<Utc>,
}

impl From<crate::entity::project_file::Model> for ProjectFileResponse {
    fn from(m: crate::entity::project_file::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            file_name: m.file_name,
            file_type: m.file_type,
            file_version: m.file_version,
            file_size: m.file_size,
            review_status: m.review_status,
            review_comments: m.review_comments,
            reviewed_by: m.reviewed_by,
            reviewed_at: m.reviewed_at,
            is_public: m.is_public,
            uploaded_by: m.uploaded_by,
            uploaded_at: m.uploaded_at,
        }
    }
}
