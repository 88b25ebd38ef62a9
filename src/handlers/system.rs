use std::net::SocketAddr;
use std::time::Instant;

use axum::Json;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{
    competition, notification, project, system_alert, system_diagnostic, system_health_log,
    system_log, system_setting, user,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::Pagination;
use crate::models::system::*;
use crate::state::AppState;
use crate::utils::net;

pub const MAINTENANCE_MODE_KEY: &str = "maintenance_mode";

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/logs",
    tag = "System",
    operation_id = "listSystemLogs",
    summary = "List system log entries",
    params(SystemLogQuery),
    responses(
        (status = 200, description = "Log entries, newest first", body = SystemLogListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_logs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SystemLogQuery>,
) -> Result<Json<SystemLogListResponse>, AppError> {
    auth_user.require_role("admin")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

    let mut select = system_log::Entity::find();
    if let Some(ref level) = query.level {
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(AppError::Validation(format!(
                "level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }
        select = select.filter(system_log::Column::Level.eq(level.clone()));
    }
    if let Some(ref source) = query.source {
        select = select.filter(system_log::Column::Source.eq(source.clone()));
    }
    if let Some(since) = query.since {
        select = select.filter(system_log::Column::CreatedAt.gte(since));
    }
    if let Some(until) = query.until {
        select = select.filter(system_log::Column::CreatedAt.lte(until));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(system_log::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(SystemLogItem::from)
        .collect();

    Ok(Json(SystemLogListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/logs/summary",
    tag = "System",
    operation_id = "systemLogSummary",
    summary = "Log counts by level over the last 24 hours",
    responses(
        (status = 200, description = "Level counts", body = SystemLogSummaryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn log_summary(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SystemLogSummaryResponse>, AppError> {
    auth_user.require_role("admin")?;

    let window_hours = 24;
    let since = chrono::Utc::now() - chrono::Duration::hours(window_hours as i64);

    let counts: Vec<(String, i64)> = system_log::Entity::find()
        .filter(system_log::Column::CreatedAt.gte(since))
        .select_only()
        .column(system_log::Column::Level)
        .column_as(system_log::Column::Id.count(), "count")
        .group_by(system_log::Column::Level)
        .into_tuple()
        .all(&state.db)
        .await?;

    Ok(Json(SystemLogSummaryResponse {
        window_hours,
        by_level: counts.into_iter().map(|(k, v)| (k, v as u64)).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/logs/cleanup",
    tag = "System",
    operation_id = "cleanupSystemLogs",
    summary = "Delete log entries older than a retention threshold",
    request_body = CleanupLogsRequest,
    responses(
        (status = 200, description = "Rows deleted", body = CleanupLogsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn cleanup_logs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CleanupLogsRequest>,
) -> Result<Json<CleanupLogsResponse>, AppError> {
    auth_user.require_role("admin")?;
    validate_cleanup_logs(&payload)?;

    let cutoff = chrono::Utc::now() - chrono::Duration::days(payload.older_than_days as i64);
    let outcome = system_log::Entity::delete_many()
        .filter(system_log::Column::CreatedAt.lt(cutoff))
        .exec(&state.db)
        .await?;

    tracing::info!(
        deleted = outcome.rows_affected,
        older_than_days = payload.older_than_days,
        "Cleaned up system logs"
    );

    Ok(Json(CleanupLogsResponse {
        deleted: outcome.rows_affected,
    }))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/health/record",
    tag = "System",
    operation_id = "recordHealthSnapshot",
    summary = "Record a health snapshot",
    description = "Usage figures come from the posting agent; the database figures are measured server-side. Overall status derives from both.",
    request_body = RecordHealthRequest,
    responses(
        (status = 201, description = "Snapshot recorded", body = HealthLogItem),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn record_health(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RecordHealthRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;
    validate_record_health(&payload)?;

    let (db_status, response_time_ms) = probe_database(&state.db).await;

    let usage_degraded = [payload.cpu_usage, payload.memory_usage, payload.disk_usage]
        .into_iter()
        .flatten()
        .any(|v| v > 90.0);
    let status = if db_status == "down" {
        "unhealthy"
    } else if usage_degraded || response_time_ms > 1000 {
        "degraded"
    } else {
        "healthy"
    };

    let model = system_health_log::ActiveModel {
        cpu_usage: Set(payload.cpu_usage),
        memory_usage: Set(payload.memory_usage),
        disk_usage: Set(payload.disk_usage),
        db_status: Set(db_status.to_string()),
        response_time_ms: Set(response_time_ms),
        status: Set(status.to_string()),
        recorded_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(HealthLogItem::from(model))))
}

#[utoipa::path(
    get,
    path = "/health/logs",
    tag = "System",
    operation_id = "listHealthSnapshots",
    summary = "List recent health snapshots",
    responses(
        (status = 200, description = "Snapshots, newest first (capped at 100)", body = Vec<HealthLogItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_health_logs(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<HealthLogItem>>, AppError> {
    auth_user.require_role("admin")?;

    let logs = system_health_log::Entity::find()
        .order_by_desc(system_health_log::Column::RecordedAt)
        .limit(100)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(logs))
}

#[utoipa::path(
    get,
    path = "/health/summary",
    tag = "System",
    operation_id = "healthSummary",
    summary = "Latest snapshot plus 24-hour status counts",
    responses(
        (status = 200, description = "Health summary", body = HealthSummaryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn health_summary(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<HealthSummaryResponse>, AppError> {
    auth_user.require_role("admin")?;

    let latest = system_health_log::Entity::find()
        .order_by_desc(system_health_log::Column::RecordedAt)
        .one(&state.db)
        .await?
        .map(HealthLogItem::from);

    let since = chrono::Utc::now() - chrono::Duration::hours(24);
    let counts: Vec<(String, i64)> = system_health_log::Entity::find()
        .filter(system_health_log::Column::RecordedAt.gte(since))
        .select_only()
        .column(system_health_log::Column::Status)
        .column_as(system_health_log::Column::Id.count(), "count")
        .group_by(system_health_log::Column::Status)
        .into_tuple()
        .all(&state.db)
        .await?;

    let mut healthy = 0;
    let mut degraded = 0;
    let mut unhealthy = 0;
    for (status, count) in counts {
        match status.as_str() {
            "healthy" => healthy = count as u64,
            "degraded" => degraded = count as u64,
            "unhealthy" => unhealthy = count as u64,
            _ => {}
        }
    }

    Ok(Json(HealthSummaryResponse {
        latest,
        healthy,
        degraded,
        unhealthy,
    }))
}

/// Unauthenticated liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    operation_id = "liveHealth",
    summary = "Liveness probe",
    responses(
        (status = 200, description = "Service is up", body = LiveHealthResponse),
        (status = 503, description = "Database unreachable", body = LiveHealthResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn live_health(State(state): State<AppState>) -> impl IntoResponse {
    let (db_status, response_time_ms) = probe_database(&state.db).await;
    let (status, code) = if db_status == "up" {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(LiveHealthResponse {
            status: status.to_string(),
            db_status: db_status.to_string(),
            response_time_ms,
        }),
    )
}

async fn probe_database(db: &DatabaseConnection) -> (&'static str, i64) {
    let started = Instant::now();
    let status = match db.ping().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::error!("Database ping failed: {e}");
            "down"
        }
    };
    (status, started.elapsed().as_millis() as i64)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/settings",
    tag = "System",
    operation_id = "listSettings",
    summary = "List all system settings",
    responses(
        (status = 200, description = "Settings", body = Vec<SettingResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_settings(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SettingResponse>>, AppError> {
    auth_user.require_role("admin")?;

    let settings = system_setting::Entity::find()
        .order_by_asc(system_setting::Column::Key)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(settings))
}

#[utoipa::path(
    get,
    path = "/settings/{key}",
    tag = "System",
    operation_id = "getSetting",
    summary = "Get a single setting",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting", body = SettingResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Setting not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(key))]
pub async fn get_setting(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SettingResponse>, AppError> {
    auth_user.require_role("admin")?;

    let setting = system_setting::Entity::find_by_id(key)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Setting not found".into()))?;

    Ok(Json(setting.into()))
}

#[utoipa::path(
    put,
    path = "/settings/{key}",
    tag = "System",
    operation_id = "upsertSetting",
    summary = "Create or update a setting",
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpsertSettingRequest,
    responses(
        (status = 200, description = "Setting stored", body = SettingResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(key))]
pub async fn upsert_setting(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
    AppJson(payload): AppJson<UpsertSettingRequest>,
) -> Result<Json<SettingResponse>, AppError> {
    auth_user.require_role("admin")?;
    if key.trim().is_empty() || key.chars().count() > 128 {
        return Err(AppError::Validation("Invalid setting key".into()));
    }

    let model = store_setting(
        &state.db,
        &key,
        &payload.value,
        payload.description,
        auth_user.user_id,
    )
    .await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/maintenance-mode",
    tag = "System",
    operation_id = "setMaintenanceMode",
    summary = "Toggle maintenance mode",
    request_body = MaintenanceModeRequest,
    responses(
        (status = 200, description = "Maintenance mode stored", body = SettingResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers, payload))]
pub async fn set_maintenance_mode(
    auth_user: AuthUser,
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    AppJson(payload): AppJson<MaintenanceModeRequest>,
) -> Result<Json<SettingResponse>, AppError> {
    auth_user.require_role("admin")?;

    let model = store_setting(
        &state.db,
        MAINTENANCE_MODE_KEY,
        if payload.enabled { "true" } else { "false" },
        None,
        auth_user.user_id,
    )
    .await?;

    system_log::ActiveModel {
        level: Set("warn".to_string()),
        source: Set("system".to_string()),
        message: Set(format!(
            "Maintenance mode {}",
            if payload.enabled { "enabled" } else { "disabled" }
        )),
        user_id: Set(Some(auth_user.user_id)),
        ip_address: Set(Some(net::client_ip(&headers, peer))),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::warn!(enabled = payload.enabled, "Maintenance mode toggled");
    Ok(Json(model.into()))
}

async fn store_setting(
    db: &DatabaseConnection,
    key: &str,
    value: &str,
    description: Option<String>,
    updated_by: i32,
) -> Result<system_setting::Model, AppError> {
    let now = chrono::Utc::now();
    let existing = system_setting::Entity::find_by_id(key.to_string())
        .one(db)
        .await?;

    let model = match existing {
        Some(setting) => {
            let mut active: system_setting::ActiveModel = setting.into();
            active.value = Set(value.to_string());
            if let Some(description) = description {
                active.description = Set(Some(description));
            }
            active.updated_by = Set(Some(updated_by));
            active.updated_at = Set(now);
            active.update(db).await?
        }
        None => {
            system_setting::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                description: Set(description),
                updated_by: Set(Some(updated_by)),
                updated_at: Set(now),
            }
            .insert(db)
            .await?
        }
    };

    Ok(model)
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/alerts",
    tag = "System",
    operation_id = "listAlerts",
    summary = "List system alerts",
    params(AlertListQuery),
    responses(
        (status = 200, description = "Alerts, newest first", body = Vec<AlertResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_alerts(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> Result<Json<Vec<AlertResponse>>, AppError> {
    auth_user.require_role("admin")?;

    let mut select = system_alert::Entity::find();
    if let Some(ref status) = query.status {
        select = select.filter(system_alert::Column::Status.eq(status.clone()));
    }
    if let Some(ref severity) = query.severity {
        select = select.filter(system_alert::Column::Severity.eq(severity.clone()));
    }

    let alerts = select
        .order_by_desc(system_alert::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(alerts))
}

#[utoipa::path(
    post,
    path = "/alerts/{id}/acknowledge",
    tag = "System",
    operation_id = "acknowledgeAlert",
    summary = "Acknowledge an active alert",
    params(("id" = i32, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert acknowledged", body = AlertResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Alert not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Alert is not active (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn acknowledge_alert(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AlertResponse>, AppError> {
    auth_user.require_role("admin")?;

    let txn = state.db.begin().await?;
    let alert = find_alert_for_update(&txn, id).await?;
    if alert.status != "active" {
        return Err(AppError::Conflict(
            "Only active alerts can be acknowledged".into(),
        ));
    }

    let mut active: system_alert::ActiveModel = alert.into();
    active.status = Set("acknowledged".to_string());
    active.acknowledged_by = Set(Some(auth_user.user_id));
    active.acknowledged_at = Set(Some(chrono::Utc::now()));
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/alerts/{id}/resolve",
    tag = "System",
    operation_id = "resolveAlert",
    summary = "Resolve an alert",
    description = "Active or acknowledged alerts can be resolved directly.",
    params(("id" = i32, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert resolved", body = AlertResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Alert not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Alert already resolved (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn resolve_alert(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AlertResponse>, AppError> {
    auth_user.require_role("admin")?;

    let txn = state.db.begin().await?;
    let alert = find_alert_for_update(&txn, id).await?;
    if alert.status == "resolved" {
        return Err(AppError::Conflict("Alert already resolved".into()));
    }

    let mut active: system_alert::ActiveModel = alert.into();
    active.status = Set("resolved".to_string());
    active.resolved_by = Set(Some(auth_user.user_id));
    active.resolved_at = Set(Some(chrono::Utc::now()));
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

async fn find_alert_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<system_alert::Model, AppError> {
    use sea_orm::sea_query::LockType;
    system_alert::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Alert not found".into()))
}

// ---------------------------------------------------------------------------
// Diagnostics & dashboard
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/diagnostics",
    tag = "System",
    operation_id = "listDiagnostics",
    summary = "List recent diagnostics runs",
    responses(
        (status = 200, description = "Runs, newest first (capped at 50)", body = Vec<DiagnosticResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_diagnostics(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<DiagnosticResponse>>, AppError> {
    auth_user.require_role("admin")?;

    let runs = system_diagnostic::Entity::find()
        .order_by_desc(system_diagnostic::Column::StartedAt)
        .limit(50)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(runs))
}

#[utoipa::path(
    post,
    path = "/diagnostics/run",
    tag = "System",
    operation_id = "runDiagnostics",
    summary = "Start a diagnostics run",
    description = "Returns the `running` row immediately; checks complete in the background and update the row to `passed` or `failed`.",
    responses(
        (status = 202, description = "Run started", body = DiagnosticResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn run_diagnostics(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;

    let model = system_diagnostic::ActiveModel {
        check_type: Set("full".to_string()),
        status: Set("running".to_string()),
        started_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let run_id = model.id;
    let task_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = complete_diagnostics(task_state, run_id).await {
            tracing::error!(run_id, "Diagnostics run failed to complete: {e:?}");
        }
    });

    Ok((StatusCode::ACCEPTED, Json(DiagnosticResponse::from(model))))
}

async fn complete_diagnostics(state: AppState, run_id: i32) -> Result<(), AppError> {
    let (db_status, response_time_ms) = probe_database(&state.db).await;

    let uploads_writable = {
        let probe = state.config.storage.uploads_dir.join(".diagnostic_probe");
        match tokio::fs::create_dir_all(&state.config.storage.uploads_dir).await {
            Ok(()) => match tokio::fs::write(&probe, b"ok").await {
                Ok(()) => {
                    let _ = tokio::fs::remove_file(&probe).await;
                    true
                }
                Err(_) => false,
            },
            Err(_) => false,
        }
    };

    let passed = db_status == "up" && uploads_writable;
    let details = serde_json::json!({
        "database": { "status": db_status, "response_time_ms": response_time_ms },
        "uploads_dir": { "writable": uploads_writable },
    });

    let run = system_diagnostic::Entity::find_by_id(run_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Diagnostics run not found".into()))?;

    let mut active: system_diagnostic::ActiveModel = run.into();
    active.status = Set(if passed { "passed" } else { "failed" }.to_string());
    active.details = Set(Some(details));
    active.completed_at = Set(Some(chrono::Utc::now()));
    active.update(&state.db).await?;

    Ok(())
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "System",
    operation_id = "dashboardStats",
    summary = "Headline counts for the admin dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn dashboard_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStatsResponse>, AppError> {
    auth_user.require_role("admin")?;

    let users = user::Entity::find().count(&state.db).await?;
    let projects = project::Entity::find()
        .filter(project::Column::Deleted.eq(false))
        .count(&state.db)
        .await?;
    let competitions = competition::Entity::find().count(&state.db).await?;
    let unread_notifications = notification::Entity::find()
        .filter(notification::Column::IsRead.eq(false))
        .count(&state.db)
        .await?;

    Ok(Json(DashboardStatsResponse {
        users,
        projects,
        competitions,
        unread_notifications,
    }))
}
