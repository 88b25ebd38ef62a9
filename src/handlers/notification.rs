use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::notification;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::notification::*;
use crate::models::shared::{Pagination, validate_priority};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Notifications",
    operation_id = "listNotifications",
    summary = "List the caller's notifications",
    params(NotificationListQuery),
    responses(
        (status = 200, description = "Notifications, newest first", body = NotificationListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_notifications(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select =
        notification::Entity::find().filter(notification::Column::UserId.eq(auth_user.user_id));

    if query.unread_only.unwrap_or(false) {
        select = select.filter(notification::Column::IsRead.eq(false));
    }
    if let Some(ref priority) = query.priority {
        validate_priority(priority)?;
        select = select.filter(notification::Column::Priority.eq(priority.clone()));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(notification::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(NotificationResponse::from)
        .collect();

    Ok(Json(NotificationListResponse {
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
    path = "/unread-count",
    tag = "Notifications",
    operation_id = "unreadCount",
    summary = "Count the caller's unread notifications",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn unread_count(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let unread = notification::Entity::find()
        .filter(notification::Column::UserId.eq(auth_user.user_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(&state.db)
        .await?;

    Ok(Json(UnreadCountResponse { unread }))
}

#[utoipa::path(
    post,
    path = "/{id}/read",
    tag = "Notifications",
    operation_id = "markNotificationRead",
    summary = "Mark a notification as read",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = NotificationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Notification not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn mark_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<NotificationResponse>, AppError> {
    let existing = find_notification(&state.db, auth_user.user_id, id).await?;
    if existing.is_read {
        return Ok(Json(existing.into()));
    }

    let mut active: notification::ActiveModel = existing.into();
    active.is_read = Set(true);
    active.read_at = Set(Some(chrono::Utc::now()));
    let model = active.update(&state.db).await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/read-all",
    tag = "Notifications",
    operation_id = "markAllNotificationsRead",
    summary = "Mark all of the caller's notifications as read",
    responses(
        (status = 204, description = "All notifications marked read"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn mark_all_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let now = chrono::Utc::now();
    notification::Entity::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .col_expr(notification::Column::ReadAt, Expr::value(Some(now)))
        .filter(notification::Column::UserId.eq(auth_user.user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Notifications",
    operation_id = "deleteNotification",
    summary = "Delete a notification",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Notification not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_notification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_notification(&state.db, auth_user.user_id, id).await?;
    let active: notification::ActiveModel = existing.into();
    active.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/send",
    tag = "Notifications",
    operation_id = "sendNotification",
    summary = "Broadcast a notification to a list of users",
    request_body = SendNotificationRequest,
    responses(
        (status = 201, description = "Notifications created"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "A recipient does not exist (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(recipients = payload.user_ids.len()))]
pub async fn send_notification(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SendNotificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;
    validate_send_notification(&payload)?;

    use crate::entity::user;
    let mut recipients: Vec<i32> = payload.user_ids.clone();
    recipients.sort_unstable();
    recipients.dedup();

    let known = user::Entity::find()
        .filter(user::Column::Id.is_in(recipients.clone()))
        .count(&state.db)
        .await?;
    if known != recipients.len() as u64 {
        return Err(AppError::NotFound("One or more recipients do not exist".into()));
    }

    let now = chrono::Utc::now();
    let priority = payload.priority.unwrap_or_else(|| "normal".to_string());
    let rows: Vec<notification::ActiveModel> = recipients
        .into_iter()
        .map(|user_id| notification::ActiveModel {
            user_id: Set(user_id),
            kind: Set("system".to_string()),
            title: Set(payload.title.trim().to_string()),
            content: Set(payload.content.clone()),
            priority: Set(priority.clone()),
            is_read: Set(false),
            created_at: Set(now),
            ..Default::default()
        })
        .collect();

    notification::Entity::insert_many(rows)
        .exec_without_returning(&state.db)
        .await?;

    Ok(StatusCode::CREATED)
}

async fn find_notification(
    db: &DatabaseConnection,
    user_id: i32,
    id: i32,
) -> Result<notification::Model, AppError> {
    notification::Entity::find_by_id(id)
        .filter(notification::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".into()))
}
