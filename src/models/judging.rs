use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AssignJudgeRequest {
    pub teacher_id: i32,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ScoreRequest {
    /// 0-100.
    pub score: f64,
    pub comment: Option<String>,
}

pub fn validate_score(payload: &ScoreRequest) -> Result<(), AppError> {
    if !payload.score.is_finite() || !(0.0..=100.0).contains(&payload.score) {
        return Err(AppError::Validation("Score must be 0-100".into()));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterResultRequest {
    pub submission_id: i32,
    /// e.g. `first_prize`, `second_prize`, `third_prize`, `honorable_mention`.
    pub award_level: String,
    pub final_score: Option<f64>,
    pub certificate_url: Option<String>,
}

pub fn validate_register_result(payload: &RegisterResultRequest) -> Result<(), AppError> {
    if payload.award_level.trim().is_empty() {
        return Err(AppError::Validation("award_level must not be empty".into()));
    }
    if let Some(score) = payload.final_score
        && (!score.is_finite() || !(0.0..=100.0).contains(&score))
    {
        return Err(AppError::Validation("final_score must be 0-100".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgeResponse {
    pub competition_id: i32,
    pub teacher_id: i32,
    pub status: String,
    pub assigned_at: DateTime<Utc>,
}

impl From<crate::entity::competition_judge::Model> for JudgeResponse {
    fn from(m: crate::entity::competition_judge::Model) -> Self {
        Self {
            competition_id: m.competition_id,
            teacher_id: m.teacher_id,
            status: m.status,
            assigned_at: m.assigned_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreResponse {
    pub submission_id: i32,
    pub judge_id: i32,
    pub score: f64,
    pub comment: Option<String>,
    pub scored_at: DateTime<Utc>,
}

impl From<crate::entity::competition_score::Model> for ScoreResponse {
    fn from(m: crate::entity::competition_score::Model) -> Self {
        Self {
            submission_id: m.submission_id,
            judge_id: m.judge_id,
            score: m.score,
            comment: m.comment,
            scored_at: m.scored_at,
        }
    }
}

/// Scoring completion for a competition.
#[derive(Serialize, utoipa::ToSchema)]
pub struct JudgingProgressResponse {
    pub total_submissions: u64,
    pub scored_submissions: u64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResultResponse {
    pub id: i32,
    pub competition_id: i32,
    pub student_id: i32,
    pub submission_id: i32,
    pub award_level: String,
    pub final_score: Option<f64>,
    pub certificate_url: Option<String>,
    pub finalized_by: Option<i32>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub published_at: DateTime<Utc>,
}

impl From<crate::entity::competition_result::Model> for ResultResponse {
    fn from(m: crate::entity::competition_result::Model) -> Self {
        Self {
            id: m.id,
            competition_id: m.competition_id,
            student_id: m.student_id,
            submission_id: m.submission_id,
            award_level: m.award_level,
            final_score: m.final_score,
            certificate_url: m.certificate_url,
            finalized_by: m.finalized_by,
            finalized_at: m.finalized_at,
            published_at: m.published_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub id: i32,
    pub competition_id: i32,
    pub student_id: i32,
    pub file_name: String,
    pub file_size: i64,
    pub description: Option<String>,
    pub version: i32,
    pub status: String,
    pub locked: bool,
    pub submitted_at: DateTime<Utc>,
}

impl From<crate::entity::competition_submission::Model> for SubmissionResponse {
    fn from(m: crate::entity::competition_submission::Model) -> Self {
        Self {
            id: m.id,
            competition_id: m.competition_id,
            student_id: m.student_id,
            file_name: m.file_name,
            file_size: m.file_size,
            description: m.description,
            version: m.version,
            status: m.status,
            locked: m.locked,
            submitted_at: m.submitted_at,
        }
    }
}
