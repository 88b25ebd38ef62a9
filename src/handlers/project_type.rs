use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{project, project_type};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::project_type::*;
use crate::state::AppState;

/// Rejects project type keys that are missing from the catalog or inactive.
pub async fn ensure_type_key<C: ConnectionTrait>(db: &C, key: &str) -> Result<(), AppError> {
    let known = project_type::Entity::find()
        .filter(project_type::Column::Key.eq(key))
        .filter(project_type::Column::IsActive.eq(true))
        .count(db)
        .await?;
    if known == 0 {
        return Err(AppError::Validation(format!(
            "Unknown project type: {key}"
        )));
    }
    Ok(())
}

async fn project_counts(db: &DatabaseConnection) -> Result<BTreeMap<String, u64>, AppError> {
    let counts: Vec<(String, i64)> = project::Entity::find()
        .filter(project::Column::Deleted.eq(false))
        .select_only()
        .column(project::Column::ProjectType)
        .column_as(project::Column::Id.count(), "count")
        .group_by(project::Column::ProjectType)
        .into_tuple()
        .all(db)
        .await?;

    Ok(counts.into_iter().map(|(k, v)| (k, v as u64)).collect())
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Project types",
    operation_id = "listProjectTypes",
    summary = "List the project type catalog as a tree",
    description = "Top-level entries with their children nested one level deep, each carrying the count of non-deleted projects referencing it.",
    responses(
        (status = 200, description = "Catalog entries ordered by sort_order, then name", body = Vec<ProjectTypeTreeItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_project_types(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectTypeTreeItem>>, AppError> {
    let entries = project_type::Entity::find()
        .order_by_asc(project_type::Column::SortOrder)
        .order_by_asc(project_type::Column::Name)
        .all(&state.db)
        .await?;
    let counts = project_counts(&state.db).await?;

    let (roots, children): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|e| e.parent_id.is_none());

    let mut by_parent: BTreeMap<i32, Vec<ProjectTypeResponse>> = BTreeMap::new();
    for child in children {
        let count = counts.get(&child.key).copied().unwrap_or(0);
        if let Some(parent_id) = child.parent_id {
            by_parent
                .entry(parent_id)
                .or_default()
                .push(ProjectTypeResponse::new(child, count));
        }
    }

    let tree = roots
        .into_iter()
        .map(|root| {
            let count = counts.get(&root.key).copied().unwrap_or(0);
            let children = by_parent.remove(&root.id).unwrap_or_default();
            ProjectTypeTreeItem {
                entry: ProjectTypeResponse::new(root, count),
                children,
            }
        })
        .collect();

    Ok(Json(tree))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Project types",
    operation_id = "projectTypeStats",
    summary = "Project counts per catalog entry",
    responses(
        (status = 200, description = "Per-type counts", body = Vec<ProjectTypeStatsItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn project_type_stats(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectTypeStatsItem>>, AppError> {
    let entries = project_type::Entity::find()
        .order_by_asc(project_type::Column::SortOrder)
        .order_by_asc(project_type::Column::Name)
        .all(&state.db)
        .await?;
    let counts = project_counts(&state.db).await?;

    let stats = entries
        .into_iter()
        .map(|e| {
            let project_count = counts.get(&e.key).copied().unwrap_or(0);
            ProjectTypeStatsItem {
                id: e.id,
                key: e.key,
                name: e.name,
                project_count,
            }
        })
        .collect();

    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Project types",
    operation_id = "getProjectType",
    summary = "Get a single catalog entry",
    params(("id" = i32, Path, description = "Project type ID")),
    responses(
        (status = 200, description = "Catalog entry", body = ProjectTypeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project type not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_project_type(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectTypeResponse>, AppError> {
    let entry = find_project_type(&state.db, id).await?;
    let count = project::Entity::find()
        .filter(project::Column::Deleted.eq(false))
        .filter(project::Column::ProjectType.eq(entry.key.clone()))
        .count(&state.db)
        .await?;

    Ok(Json(ProjectTypeResponse::new(entry, count)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Project types",
    operation_id = "createProjectType",
    summary = "Create a catalog entry",
    request_body = CreateProjectTypeRequest,
    responses(
        (status = 201, description = "Entry created", body = ProjectTypeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Key already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_project_type(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProjectTypeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;
    validate_create_project_type(&payload)?;

    if let Some(parent_id) = payload.parent_id {
        let parent = find_project_type(&state.db, parent_id).await.map_err(|_| {
            AppError::Validation(format!("Parent type {parent_id} does not exist"))
        })?;
        if parent.parent_id.is_some() {
            return Err(AppError::Validation(
                "The catalog nests one level deep; the parent must be a top-level entry".into(),
            ));
        }
    }

    let now = chrono::Utc::now();
    let model = project_type::ActiveModel {
        key: Set(payload.key),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        parent_id: Set(payload.parent_id),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = match model.insert(&state.db).await {
        Ok(model) => model,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict("Type key is already in use".into()));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((StatusCode::CREATED, Json(ProjectTypeResponse::new(model, 0))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Project types",
    operation_id = "updateProjectType",
    summary = "Update a catalog entry",
    description = "The key is immutable; rename, reorder, or deactivate instead. Deactivating keeps existing projects valid but rejects the key on new ones.",
    params(("id" = i32, Path, description = "Project type ID")),
    request_body = UpdateProjectTypeRequest,
    responses(
        (status = 200, description = "Entry updated", body = ProjectTypeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project type not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_project_type(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProjectTypeRequest>,
) -> Result<Json<ProjectTypeResponse>, AppError> {
    auth_user.require_role("admin")?;
    validate_update_project_type(&payload)?;

    let existing = find_project_type(&state.db, id).await?;
    let key = existing.key.clone();

    let mut active: project_type::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(sort_order) = payload.sort_order {
        active.sort_order = Set(sort_order);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&state.db).await?;

    let count = project::Entity::find()
        .filter(project::Column::Deleted.eq(false))
        .filter(project::Column::ProjectType.eq(key))
        .count(&state.db)
        .await?;

    Ok(Json(ProjectTypeResponse::new(model, count)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Project types",
    operation_id = "deleteProjectType",
    summary = "Delete a catalog entry",
    description = "Entries that still have children or referencing projects cannot be deleted; deactivate them instead.",
    params(("id" = i32, Path, description = "Project type ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project type not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Entry is still referenced (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_project_type(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;

    let existing = find_project_type(&state.db, id).await?;

    let children = project_type::Entity::find()
        .filter(project_type::Column::ParentId.eq(id))
        .count(&state.db)
        .await?;
    if children > 0 {
        return Err(AppError::Conflict(
            "Type still has child entries".into(),
        ));
    }

    let referenced = project::Entity::find()
        .filter(project::Column::ProjectType.eq(existing.key.clone()))
        .count(&state.db)
        .await?;
    if referenced > 0 {
        return Err(AppError::Conflict(
            "Projects still reference this type".into(),
        ));
    }

    let active: project_type::ActiveModel = existing.into();
    active.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_project_type(
    db: &DatabaseConnection,
    id: i32,
) -> Result<project_type::Model, AppError> {
    project_type::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project type not found".into()))
}
