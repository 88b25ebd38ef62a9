use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, double_option};
use crate::error::AppError;

pub const ROLE_KEYS: &[&str] = &["admin", "teacher", "student"];

pub fn validate_role_keys(roles: &[String]) -> Result<(), AppError> {
    if roles.is_empty() {
        return Err(AppError::Validation("At least one role is required".into()));
    }
    for role in roles {
        if !ROLE_KEYS.contains(&role.as_str()) {
            return Err(AppError::Validation(format!("Unknown role: {role}")));
        }
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Matches against username, email, and real name.
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub department: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    /// Role keys to grant. Must be non-empty.
    pub roles: Vec<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub grade: Option<String>,
    pub major: Option<String>,
    pub real_name: Option<String>,
    pub phone: Option<String>,
}

pub fn validate_create_user(payload: &CreateUserRequest) -> Result<(), AppError> {
    super::auth::validate_register_request(&super::auth::RegisterRequest {
        username: payload.username.clone(),
        password: payload.password.clone(),
        email: payload.email.clone(),
    })?;
    validate_role_keys(&payload.roles)
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub status: Option<String>,
    pub roles: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub grade: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub major: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub real_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    pub interests: Option<Vec<String>>,
}

pub fn validate_update_user(payload: &UpdateUserRequest) -> Result<(), AppError> {
    if let Some(ref email) = payload.email {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation("Invalid email address".into()));
        }
    }
    if let Some(ref status) = payload.status
        && status != "active"
        && status != "inactive"
    {
        return Err(AppError::Validation(
            "Status must be `active` or `inactive`".into(),
        ));
    }
    if let Some(ref roles) = payload.roles {
        validate_role_keys(roles)?;
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ResetPasswordRequest {
    /// New password (8-128 characters).
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct UserListItem {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub status: String,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserListItem>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserDetailResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub status: String,
    pub roles: Vec<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub grade: Option<String>,
    pub major: Option<String>,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub student_no: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub interests: Vec<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate counts for the admin user dashboard.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserStatsResponse {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    /// Counts keyed by role.
    pub by_role: std::collections::BTreeMap<String, u64>,
    /// Counts keyed by department (absent departments grouped under "").
    pub by_department: std::collections::BTreeMap<String, u64>,
}
