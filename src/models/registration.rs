use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub team_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

pub fn validate_register(payload: &RegisterRequest) -> Result<(), AppError> {
    if let Some(ref team) = payload.team_name
        && team.chars().count() > 128
    {
        return Err(AppError::Validation(
            "team_name must be at most 128 characters".into(),
        ));
    }
    if let Some(ref email) = payload.contact_email
        && !email.contains('@')
    {
        return Err(AppError::Validation("Invalid contact_email".into()));
    }
    Ok(())
}

/// Admin verification of a registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct VerifyRegistrationRequest {
    /// `approved` or `rejected`.
    pub verdict: String,
}

/// Advisor sign-off on a registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct TeacherReviewRequest {
    /// `approved` or `rejected`.
    pub verdict: String,
    pub comment: Option<String>,
}

pub fn validate_verdict(verdict: &str) -> Result<(), AppError> {
    match verdict {
        "approved" | "rejected" => Ok(()),
        _ => Err(AppError::Validation(
            "Verdict must be `approved` or `rejected`".into(),
        )),
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RegistrationResponse {
    pub id: i32,
    pub competition_id: i32,
    pub student_id: i32,
    pub team_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub status: String,
    pub teacher_review_status: String,
    pub teacher_review_comment: Option<String>,
    pub teacher_review_time: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
}

impl From<crate::entity::competition_registration::Model> for RegistrationResponse {
    fn from(m: crate::entity::competition_registration::Model) -> Self {
        Self {
            id: m.id,
            competition_id: m.competition_id,
            student_id: m.student_id,
            team_name: m.team_name,
            contact_phone: m.contact_phone,
            contact_email: m.contact_email,
            status: m.status,
            teacher_review_status: m.teacher_review_status,
            teacher_review_comment: m.teacher_review_comment,
            teacher_review_time: m.teacher_review_time,
            registered_at: m.registered_at,
        }
    }
}
