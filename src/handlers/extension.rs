use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{project, project_extension};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::extension::*;
use crate::models::project::status;
use crate::state::AppState;
use crate::utils::notify;

use super::project::{check_project_access, find_project};

#[utoipa::path(
    post,
    path = "/{id}/extensions",
    tag = "Extensions",
    operation_id = "applyForExtension",
    summary = "Apply for a deadline extension",
    description = "Only one pending application per project is allowed. Notifies the advising teacher.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = CreateExtensionRequest,
    responses(
        (status = 201, description = "Application created", body = ExtensionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "A pending application already exists (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn apply_for_extension(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateExtensionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_extension(&payload)?;

    let txn = state.db.begin().await?;
    let project = super::project::find_project_for_update(&txn, id).await?;
    if project.student_id != auth_user.user_id || project.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }
    if project.status != status::APPROVED && project.status != status::IN_PROGRESS {
        return Err(AppError::Conflict(
            "Only approved or in-progress projects can apply for extensions".into(),
        ));
    }

    let pending = project_extension::Entity::find()
        .filter(project_extension::Column::ProjectId.eq(id))
        .filter(project_extension::Column::Status.eq("pending"))
        .count(&txn)
        .await?;
    if pending > 0 {
        return Err(AppError::Conflict(
            "A pending extension application already exists for this project".into(),
        ));
    }

    let model = project_extension::ActiveModel {
        project_id: Set(id),
        applicant_id: Set(auth_user.user_id),
        reason: Set(payload.reason.trim().to_string()),
        original_end_date: Set(payload.original_end_date),
        requested_end_date: Set(payload.requested_end_date),
        status: Set("pending".to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    notify::notify(
        &txn,
        project.teacher_id,
        "extension_request",
        "Extension application",
        &format!(
            "Project \"{}\" has a pending deadline extension application",
            project.title
        ),
        "normal",
    )
    .await?;

    txn.commit().await?;
    Ok((StatusCode::CREATED, Json(ExtensionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}/extensions",
    tag = "Extensions",
    operation_id = "listExtensions",
    summary = "List extension applications for a project",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Applications, newest first", body = Vec<ExtensionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_extensions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ExtensionResponse>>, AppError> {
    let project = find_project(&state.db, id).await?;
    check_project_access(&auth_user, &project)?;

    let extensions = project_extension::Entity::find()
        .filter(project_extension::Column::ProjectId.eq(id))
        .order_by_desc(project_extension::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(extensions))
}

#[utoipa::path(
    get,
    path = "/extensions/pending",
    tag = "Extensions",
    operation_id = "listPendingExtensions",
    summary = "List pending extension applications awaiting the caller's review",
    description = "Teachers see applications on projects they advise; admins see all pending applications.",
    responses(
        (status = 200, description = "Pending applications", body = Vec<ExtensionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_pending_extensions(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExtensionResponse>>, AppError> {
    auth_user.require_any_role(&["teacher", "admin"])?;

    let mut select = project_extension::Entity::find()
        .filter(project_extension::Column::Status.eq("pending"));

    if !auth_user.has_role("admin") {
        select = select.filter(
            project_extension::Column::ProjectId.in_subquery(
                sea_orm::sea_query::Query::select()
                    .column(project::Column::Id)
                    .from(project::Entity)
                    .and_where(project::Column::TeacherId.eq(auth_user.user_id))
                    .to_owned(),
            ),
        );
    }

    let extensions = select
        .order_by_asc(project_extension::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(extensions))
}

#[utoipa::path(
    post,
    path = "/{id}/extensions/{extension_id}/review",
    tag = "Extensions",
    operation_id = "reviewExtension",
    summary = "Review an extension application",
    description = "The advising teacher (or an admin) approves or rejects a pending application. The applicant is notified.",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("extension_id" = i32, Path, description = "Extension application ID"),
    ),
    request_body = ReviewExtensionRequest,
    responses(
        (status = 200, description = "Review applied", body = ExtensionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project or application not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Application already reviewed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, extension_id))]
pub async fn review_extension(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, extension_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<ReviewExtensionRequest>,
) -> Result<Json<ExtensionResponse>, AppError> {
    auth_user.require_any_role(&["teacher", "admin"])?;
    validate_review_extension(&payload)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let project = super::project::find_project_for_update(&txn, id).await?;
    if !auth_user.has_role("admin") && project.teacher_id != auth_user.user_id {
        return Err(AppError::NotFound("Project not found".into()));
    }

    let existing = find_extension(&txn, id, extension_id).await?;
    if existing.status != "pending" {
        return Err(AppError::Conflict(
            "Extension application already reviewed".into(),
        ));
    }

    let applicant_id = existing.applicant_id;
    let mut active: project_extension::ActiveModel = existing.into();
    active.status = Set(payload.verdict.clone());
    active.reviewer_id = Set(Some(auth_user.user_id));
    active.review_comments = Set(payload.comments.clone());
    active.reviewed_at = Set(Some(now));
    let model = active.update(&txn).await?;

    notify::notify(
        &txn,
        applicant_id,
        "extension_review",
        &format!("Extension {}", payload.verdict),
        &format!(
            "Your extension application for project \"{}\" was {}",
            project.title, payload.verdict
        ),
        "high",
    )
    .await?;

    txn.commit().await?;
    Ok(Json(model.into()))
}

async fn find_extension(
    txn: &DatabaseTransaction,
    project_id: i32,
    extension_id: i32,
) -> Result<project_extension::Model, AppError> {
    use sea_orm::sea_query::LockType;
    project_extension::Entity::find_by_id(extension_id)
        .filter(project_extension::Column::ProjectId.eq(project_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Extension application not found".into()))
}
