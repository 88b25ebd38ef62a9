use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_priority, validate_title};
use crate::error::AppError;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct NotificationListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// When true, only unread notifications are returned.
    pub unread_only: Option<bool>,
    pub priority: Option<String>,
}

/// Admin broadcast to a list of users.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SendNotificationRequest {
    pub user_ids: Vec<i32>,
    pub title: String,
    pub content: String,
    /// Defaults to `normal`.
    pub priority: Option<String>,
}

pub fn validate_send_notification(payload: &SendNotificationRequest) -> Result<(), AppError> {
    if payload.user_ids.is_empty() {
        return Err(AppError::Validation("user_ids must not be empty".into()));
    }
    if payload.user_ids.len() > 1000 {
        return Err(AppError::Validation("Too many recipients: max 1000".into()));
    }
    validate_title(&payload.title)?;
    if payload.content.trim().is_empty() {
        return Err(AppError::Validation("Content must not be empty".into()));
    }
    if let Some(ref priority) = payload.priority {
        validate_priority(priority)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub priority: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::notification::Model> for NotificationResponse {
    fn from(m: crate::entity::notification::Model) -> Self {
        Self {
            id: m.id,
            kind: m.kind,
            title: m.title,
            content: m.content,
            priority: m.priority,
            is_read: m.is_read,
            read_at: m.read_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NotificationListResponse {
    pub data: Vec<NotificationResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UnreadCountResponse {
    pub unread: u64,
}
