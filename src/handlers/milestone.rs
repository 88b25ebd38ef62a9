use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::project_milestone;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::milestone::*;
use crate::state::AppState;

use super::project::{check_project_access, find_project};

#[utoipa::path(
    post,
    path = "/{id}/milestones",
    tag = "Milestones",
    operation_id = "createMilestone",
    summary = "Add a milestone to a project",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = CreateMilestoneRequest,
    responses(
        (status = 201, description = "Milestone created", body = MilestoneResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn create_milestone(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateMilestoneRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_milestone(&payload)?;

    let project = find_project(&state.db, id).await?;
    if project.student_id != auth_user.user_id || project.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }

    let now = chrono::Utc::now();
    let model = project_milestone::ActiveModel {
        project_id: Set(id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        due_date: Set(payload.due_date),
        status: Set("pending".to_string()),
        progress: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(MilestoneResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}/milestones",
    tag = "Milestones",
    operation_id = "listMilestones",
    summary = "List milestones for a project",
    description = "Pending milestones past their due date are flipped to `overdue` before the list is returned.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Milestones ordered by due date", body = Vec<MilestoneResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_milestones(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<MilestoneResponse>>, AppError> {
    let project = find_project(&state.db, id).await?;
    check_project_access(&auth_user, &project)?;

    project_milestone::Entity::update_many()
        .col_expr(project_milestone::Column::Status, Expr::value("overdue"))
        .filter(project_milestone::Column::ProjectId.eq(id))
        .filter(project_milestone::Column::Status.eq("pending"))
        .filter(project_milestone::Column::DueDate.lt(chrono::Utc::now()))
        .exec(&state.db)
        .await?;

    let milestones = project_milestone::Entity::find()
        .filter(project_milestone::Column::ProjectId.eq(id))
        .order_by_asc(project_milestone::Column::DueDate)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(milestones))
}

#[utoipa::path(
    patch,
    path = "/{id}/milestones/{milestone_id}",
    tag = "Milestones",
    operation_id = "updateMilestone",
    summary = "Update a milestone",
    description = "Reaching 100% progress marks the milestone completed and stamps completed_date.",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("milestone_id" = i32, Path, description = "Milestone ID"),
    ),
    request_body = UpdateMilestoneRequest,
    responses(
        (status = 200, description = "Milestone updated", body = MilestoneResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project or milestone not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, milestone_id))]
pub async fn update_milestone(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, milestone_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateMilestoneRequest>,
) -> Result<Json<MilestoneResponse>, AppError> {
    validate_update_milestone(&payload)?;

    let project = find_project(&state.db, id).await?;
    if project.student_id != auth_user.user_id || project.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }

    let existing = find_milestone(&state.db, id, milestone_id).await?;

    let now = chrono::Utc::now();
    let mut active: project_milestone::ActiveModel = existing.into();
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(due_date) = payload.due_date {
        active.due_date = Set(due_date);
    }
    if let Some(progress) = payload.progress {
        active.progress = Set(progress);
        if progress >= 100 {
            active.status = Set("completed".to_string());
            active.completed_date = Set(Some(now));
        }
    }
    active.updated_at = Set(now);

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}/milestones/{milestone_id}",
    tag = "Milestones",
    operation_id = "deleteMilestone",
    summary = "Delete a milestone",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("milestone_id" = i32, Path, description = "Milestone ID"),
    ),
    responses(
        (status = 204, description = "Milestone deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project or milestone not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, milestone_id))]
pub async fn delete_milestone(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, milestone_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let project = find_project(&state.db, id).await?;
    if project.student_id != auth_user.user_id || project.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }

    let existing = find_milestone(&state.db, id, milestone_id).await?;
    let active: project_milestone::ActiveModel = existing.into();
    active.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_milestone(
    db: &DatabaseConnection,
    project_id: i32,
    milestone_id: i32,
) -> Result<project_milestone::Model, AppError> {
    project_milestone::Entity::find_by_id(milestone_id)
        .filter(project_milestone::Column::ProjectId.eq(project_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Milestone not found".into()))
}
