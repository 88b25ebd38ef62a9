use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::Pagination;
use crate::error::AppError;

pub const LOG_LEVELS: &[&str] = &["debug", "info", "warn", "error"];

#[derive(Deserialize, utoipa::IntoParams)]
pub struct SystemLogQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub level: Option<String>,
    pub source: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CleanupLogsRequest {
    /// Delete log rows older than this many days.
    pub older_than_days: u32,
}

pub fn validate_cleanup_logs(payload: &CleanupLogsRequest) -> Result<(), AppError> {
    if payload.older_than_days == 0 {
        return Err(AppError::Validation(
            "older_than_days must be at least 1".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SystemLogItem {
    pub id: i32,
    pub level: String,
    pub source: String,
    pub message: String,
    pub user_id: Option<i32>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::system_log::Model> for SystemLogItem {
    fn from(m: crate::entity::system_log::Model) -> Self {
        Self {
            id: m.id,
            level: m.level,
            source: m.source,
            message: m.message,
            user_id: m.user_id,
            ip_address: m.ip_address,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SystemLogListResponse {
    pub data: Vec<SystemLogItem>,
    pub pagination: Pagination,
}

/// Counts by level over a recent window.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SystemLogSummaryResponse {
    pub window_hours: u32,
    pub by_level: std::collections::BTreeMap<String, u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CleanupLogsResponse {
    pub deleted: u64,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Health snapshot posted by a monitoring agent. The database figures are
/// measured server-side regardless of what the caller supplies.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct RecordHealthRequest {
    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<f64>,
    pub disk_usage: Option<f64>,
}

pub fn validate_record_health(payload: &RecordHealthRequest) -> Result<(), AppError> {
    for (name, value) in [
        ("cpu_usage", payload.cpu_usage),
        ("memory_usage", payload.memory_usage),
        ("disk_usage", payload.disk_usage),
    ] {
        if let Some(v) = value
            && (!v.is_finite() || !(0.0..=100.0).contains(&v))
        {
            return Err(AppError::Validation(format!("{name} must be 0-100")));
        }
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthLogItem {
    pub id: i32,
    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<f64>,
    pub disk_usage: Option<f64>,
    pub db_status: String,
    pub response_time_ms: i64,
    pub status: String,
    pub recorded_at: DateTime<Utc>,
}

impl From<crate::entity::system_health_log::Model> for HealthLogItem {
    fn from(m: crate::entity::system_health_log::Model) -> Self {
        Self {
            id: m.id,
            cpu_usage: m.cpu_usage,
            memory_usage: m.memory_usage,
            disk_usage: m.disk_usage,
            db_status: m.db_status,
            response_time_ms: m.response_time_ms,
            status: m.status,
            recorded_at: m.recorded_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthSummaryResponse {
    pub latest: Option<HealthLogItem>,
    pub healthy: u64,
    pub degraded: u64,
    pub unhealthy: u64,
}

/// Live health probe result.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LiveHealthResponse {
    pub status: String,
    pub db_status: String,
    pub response_time_ms: i64,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpsertSettingRequest {
    pub value: String,
    pub description: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct MaintenanceModeRequest {
    pub enabled: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SettingResponse {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_by: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::system_setting::Model> for SettingResponse {
    fn from(m: crate::entity::system_setting::Model) -> Self {
        Self {
            key: m.key,
            value: m.value,
            description: m.description,
            updated_by: m.updated_by,
            updated_at: m.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AlertListQuery {
    pub status: Option<String>,
    pub severity: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AlertResponse {
    pub id: i32,
    pub alert_type: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub status: String,
    pub acknowledged_by: Option<i32>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<i32>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::system_alert::Model> for AlertResponse {
    fn from(m: crate::entity::system_alert::Model) -> Self {
        Self {
            id: m.id,
            alert_type: m.alert_type,
            severity: m.severity,
            title: m.title,
            message: m.message,
            status: m.status,
            acknowledged_by: m.acknowledged_by,
            acknowledged_at: m.acknowledged_at,
            resolved_by: m.resolved_by,
            resolved_at: m.resolved_at,
            created_at: m.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostics & dashboard
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct DiagnosticResponse {
    pub id: i32,
    pub check_type: String,
    pub status: String,
    pub details: Option<serde_json::Value>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<crate::entity::system_diagnostic::Model> for DiagnosticResponse {
    fn from(m: crate::entity::system_diagnostic::Model) -> Self {
        Self {
            id: m.id,
            check_type: m.check_type,
            status: m.status,
            details: m.details,
            started_at: m.started_at,
            completed_at: m.completed_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardStatsResponse {
    pub users: u64,
    pub projects: u64,
    pub competitions: u64,
    pub unread_notifications: u64,
}
