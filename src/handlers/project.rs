use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{project, project_file, project_review, project_status_history};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::project::{status, *};
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::notify;

use super::advisor;

#[utoipa::path(
    post,
    path = "/",
    tag = "Projects",
    operation_id = "createProject",
    summary = "Create a project draft",
    description = "Creates a project in `draft` status. The advisor defaults to the student's bound teacher; a different teacher can be named explicitly.",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("student")?;
    validate_create_project(&payload)?;
    super::project_type::ensure_type_key(&state.db, &payload.project_type).await?;

    let teacher_id = match payload.teacher_id {
        Some(id) => {
            if !advisor::has_role(&state.db, id, "teacher").await? {
                return Err(AppError::Validation("Named user is not a teacher".into()));
            }
            id
        }
        None => {
            use crate::entity::student_teacher;
            student_teacher::Entity::find()
                .filter(student_teacher::Column::StudentId.eq(auth_user.user_id))
                .order_by_asc(student_teacher::Column::BoundAt)
                .one(&state.db)
                .await?
                .map(|b| b.teacher_id)
                .ok_or_else(|| {
                    AppError::Validation(
                        "No advisor bound; name a teacher_id explicitly".into(),
                    )
                })?
        }
    };

    let now = chrono::Utc::now();
    let new_project = project::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        project_type: Set(payload.project_type),
        student_id: Set(auth_user.user_id),
        teacher_id: Set(teacher_id),
        status: Set(status::DRAFT.to_string()),
        plan: Set(payload.plan),
        progress: Set(0),
        deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_project.insert(&state.db).await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Projects",
    operation_id = "listProjects",
    summary = "List projects with pagination and filters",
    description = "Students see their own projects, teachers the projects they advise, admins everything. Soft-deleted projects are hidden from non-admins.",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "List of projects", body = ProjectListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_projects(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<ProjectListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = project::Entity::find();

    if !auth_user.has_role("admin") {
        select = select.filter(project::Column::Deleted.eq(false));
        if auth_user.has_role("teacher") {
            select = select.filter(
                Condition::any()
                    .add(project::Column::TeacherId.eq(auth_user.user_id))
                    .add(project::Column::StudentId.eq(auth_user.user_id)),
            );
        } else {
            select = select.filter(project::Column::StudentId.eq(auth_user.user_id));
        }
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(project::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }
    if let Some(ref wanted) = query.status {
        if !status::ALL.contains(&wanted.as_str()) {
            return Err(AppError::Validation(format!(
                "status must be one of: {}",
                status::ALL.join(", ")
            )));
        }
        select = select.filter(project::Column::Status.eq(wanted.clone()));
    }
    if let Some(ref project_type) = query.project_type {
        select = select.filter(project::Column::ProjectType.eq(project_type.clone()));
    }

    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match sort_by {
        "created_at" => project::Column::CreatedAt,
        "updated_at" => project::Column::UpdatedAt,
        "title" => project::Column::Title,
        "progress" => project::Column::Progress,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, updated_at, title, progress".into(),
            ));
        }
    };

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by(sort_column, sort_order)
        .select_only()
        .column(project::Column::Id)
        .column(project::Column::Title)
        .column(project::Column::ProjectType)
        .column(project::Column::StudentId)
        .column(project::Column::TeacherId)
        .column(project::Column::Status)
        .column(project::Column::Progress)
        .column(project::Column::CreatedAt)
        .column(project::Column::UpdatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<ProjectListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(ProjectListResponse {
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
    path = "/{id}",
    tag = "Projects",
    operation_id = "getProject",
    summary = "Get a project with participants, files, and reviews",
    description = "Returns 404 (not 403) for projects the caller cannot see, to prevent enumeration.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project details", body = ProjectDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectDetailResponse>, AppError> {
    let model = find_project(&state.db, id).await?;
    check_project_access(&auth_user, &model)?;

    let student = super::user::find_user(&state.db, model.student_id).await?;
    let teacher = super::user::find_user(&state.db, model.teacher_id).await?;

    let files = project_file::Entity::find()
        .filter(project_file::Column::ProjectId.eq(id))
        .order_by_desc(project_file::Column::UploadedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let reviews = project_review::Entity::find()
        .filter(project_review::Column::ProjectId.eq(id))
        .order_by_desc(project_review::Column::ReviewedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ProjectDetailResponse {
        project: model.into(),
        student_username: student.username,
        teacher_username: teacher.username,
        files,
        reviews,
    }))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Projects",
    operation_id = "updateProject",
    summary = "Update a draft or rejected project",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Project is not editable in its current status (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    validate_update_project(&payload)?;
    if let Some(ref project_type) = payload.project_type {
        super::project_type::ensure_type_key(&state.db, project_type).await?;
    }

    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;
    if existing.student_id != auth_user.user_id || existing.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }
    if existing.status != status::DRAFT && existing.status != status::REJECTED {
        return Err(AppError::Conflict(
            "Only draft or rejected projects can be edited".into(),
        ));
    }

    let mut active: project::ActiveModel = existing.into();
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(project_type) = payload.project_type {
        active.project_type = Set(project_type);
    }
    if let Some(plan) = payload.plan {
        active.plan = Set(plan);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Projects",
    operation_id = "deleteProject",
    summary = "Soft-delete a draft project",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Only drafts can be deleted (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;
    if existing.student_id != auth_user.user_id || existing.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }
    if existing.status != status::DRAFT {
        return Err(AppError::Conflict("Only drafts can be deleted".into()));
    }

    let mut active: project::ActiveModel = existing.into();
    active.deleted = Set(true);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/restore",
    tag = "Projects",
    operation_id = "restoreProject",
    summary = "Restore a soft-deleted project",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project restored", body = ProjectResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Project is not deleted (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn restore_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectResponse>, AppError> {
    auth_user.require_role("admin")?;

    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;
    if !existing.deleted {
        return Err(AppError::Conflict("Project is not deleted".into()));
    }

    let mut active: project::ActiveModel = existing.into();
    active.deleted = Set(false);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/submit",
    tag = "Projects",
    operation_id = "submitProject",
    summary = "Submit a project for review",
    description = "Moves a draft or rejected project to `submitted` and stamps submitted_at. The advisor is notified.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project submitted", body = ProjectResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Project is not submittable in its current status (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn submit_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectResponse>, AppError> {
    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;
    if existing.student_id != auth_user.user_id || existing.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }
    if existing.status != status::DRAFT && existing.status != status::REJECTED {
        return Err(AppError::Conflict(
            "Only draft or rejected projects can be submitted".into(),
        ));
    }

    let old_status = existing.status.clone();
    let teacher_id = existing.teacher_id;
    let title = existing.title.clone();

    let mut active: project::ActiveModel = existing.into();
    active.status = Set(status::SUBMITTED.to_string());
    active.submitted_at = Set(Some(now));
    active.rejection_reason = Set(None);
    active.updated_at = Set(now);
    let model = active.update(&txn).await?;

    record_status_change(&txn, id, &old_status, status::SUBMITTED, None, auth_user.user_id).await?;

    notify::notify(
        &txn,
        teacher_id,
        "project_review",
        "Project submitted for review",
        &format!("Project \"{title}\" is awaiting your review"),
        "high",
    )
    .await?;

    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/review",
    tag = "Projects",
    operation_id = "reviewProject",
    summary = "Review a submitted project",
    description = "The advising teacher (or an admin) approves, rejects, or parks a submitted project in `reviewing`. Verdicts write an audit row and a status-history row and notify the student.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = ReviewProjectRequest,
    responses(
        (status = 200, description = "Review applied", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Project is not under review (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn review_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReviewProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    auth_user.require_any_role(&["teacher", "admin"])?;
    validate_review_project(&payload)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;
    if existing.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }
    if !auth_user.has_role("admin") && existing.teacher_id != auth_user.user_id {
        return Err(AppError::NotFound("Project not found".into())); // Prevent enumeration
    }
    if existing.status != status::SUBMITTED && existing.status != status::REVIEWING {
        return Err(AppError::Conflict(
            "Only submitted or reviewing projects can be reviewed".into(),
        ));
    }

    let old_status = existing.status.clone();
    let student_id = existing.student_id;
    let title = existing.title.clone();

    let mut active: project::ActiveModel = existing.into();
    match payload.verdict.as_str() {
        "approved" => {
            active.status = Set(status::APPROVED.to_string());
            active.approved_at = Set(Some(now));
            active.approved_by = Set(Some(auth_user.user_id));
            active.rejection_reason = Set(None);
        }
        "rejected" => {
            active.status = Set(status::REJECTED.to_string());
            active.rejection_reason = Set(payload.comments.clone());
        }
        _ => {
            active.status = Set(status::REVIEWING.to_string());
        }
    }
    active.updated_at = Set(now);
    let model = active.update(&txn).await?;

    if payload.verdict != "reviewing" {
        project_review::ActiveModel {
            project_id: Set(id),
            reviewer_id: Set(auth_user.user_id),
            verdict: Set(payload.verdict.clone()),
            comments: Set(payload.comments.clone()),
            is_force: Set(false),
            reviewed_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    record_status_change(
        &txn,
        id,
        &old_status,
        &model.status,
        payload.comments.as_deref(),
        auth_user.user_id,
    )
    .await?;

    if payload.verdict != "reviewing" {
        let outcome = if payload.verdict == "approved" {
            "approved"
        } else {
            "rejected"
        };
        notify::notify(
            &txn,
            student_id,
            "project_review",
            &format!("Project {outcome}"),
            &format!("Your project \"{title}\" was {outcome}"),
            "high",
        )
        .await?;
    }

    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/reviews",
    tag = "Projects",
    operation_id = "listProjectReviews",
    summary = "List review audit rows for a project",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Review history", body = Vec<ProjectReviewItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_project_reviews(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ProjectReviewItem>>, AppError> {
    let model = find_project(&state.db, id).await?;
    check_project_access(&auth_user, &model)?;

    let reviews = project_review::Entity::find()
        .filter(project_review::Column::ProjectId.eq(id))
        .order_by_desc(project_review::Column::ReviewedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(reviews))
}

#[utoipa::path(
    get,
    path = "/{id}/history",
    tag = "Projects",
    operation_id = "listProjectStatusHistory",
    summary = "List status transitions for a project",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Status history", body = Vec<StatusHistoryItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_status_history(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<StatusHistoryItem>>, AppError> {
    let model = find_project(&state.db, id).await?;
    check_project_access(&auth_user, &model)?;

    let history = project_status_history::Entity::find()
        .filter(project_status_history::Column::ProjectId.eq(id))
        .order_by_desc(project_status_history::Column::ChangedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(history))
}

#[utoipa::path(
    post,
    path = "/{id}/force-status",
    tag = "Projects",
    operation_id = "forceProjectStatus",
    summary = "Force a project into an arbitrary status",
    description = "Admin-only escape hatch for stuck workflows. The transition is audited with `is_force` set and a mandatory reason.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = ForceStatusRequest,
    responses(
        (status = 200, description = "Status forced", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn force_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ForceStatusRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    auth_user.require_role("admin")?;
    validate_force_status(&payload)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;

    let old_status = existing.status.clone();
    let mut active: project::ActiveModel = existing.into();
    active.status = Set(payload.status.clone());
    if payload.status == status::COMPLETED {
        active.finish_time = Set(Some(now));
    }
    active.updated_at = Set(now);
    let model = active.update(&txn).await?;

    project_review::ActiveModel {
        project_id: Set(id),
        reviewer_id: Set(auth_user.user_id),
        verdict: Set(payload.status.clone()),
        comments: Set(Some(payload.reason.clone())),
        is_force: Set(true),
        reviewed_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    record_status_change(
        &txn,
        id,
        &old_status,
        &payload.status,
        Some(&payload.reason),
        auth_user.user_id,
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        project_id = id,
        from = %old_status,
        to = %payload.status,
        admin = auth_user.user_id,
        "Forced project status transition"
    );

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/progress",
    tag = "Projects",
    operation_id = "updateProjectProgress",
    summary = "Update project completion percentage",
    description = "Only approved or in-progress projects accept progress updates. Reaching 100 completes the project and stamps finish_time.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = UpdateProgressRequest,
    responses(
        (status = 200, description = "Progress updated", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Project does not accept progress updates (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_progress(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProgressRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    validate_update_progress(&payload)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let existing = find_project_for_update(&txn, id).await?;
    if existing.student_id != auth_user.user_id || existing.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }
    if existing.status != status::APPROVED && existing.status != status::IN_PROGRESS {
        return Err(AppError::Conflict(
            "Only approved or in-progress projects accept progress updates".into(),
        ));
    }

    let old_status = existing.status.clone();
    let mut active: project::ActiveModel = existing.into();
    active.progress = Set(payload.progress);
    let new_status = if payload.progress >= 100 {
        active.finish_time = Set(Some(now));
        status::COMPLETED
    } else {
        status::IN_PROGRESS
    };
    active.status = Set(new_status.to_string());
    active.updated_at = Set(now);
    let model = active.update(&txn).await?;

    if old_status != new_status {
        record_status_change(&txn, id, &old_status, new_status, None, auth_user.user_id).await?;
    }

    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Projects",
    operation_id = "projectStats",
    summary = "Aggregate project counts",
    responses(
        (status = 200, description = "Project statistics", body = ProjectStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn project_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProjectStatsResponse>, AppError> {
    auth_user.require_role("admin")?;

    let base = project::Entity::find().filter(project::Column::Deleted.eq(false));
    let total = base.clone().count(&state.db).await?;

    let status_counts: Vec<(String, i64)> = base
        .clone()
        .select_only()
        .column(project::Column::Status)
        .column_as(project::Column::Id.count(), "count")
        .group_by(project::Column::Status)
        .into_tuple()
        .all(&state.db)
        .await?;

    let type_counts: Vec<(String, i64)> = base
        .select_only()
        .column(project::Column::ProjectType)
        .column_as(project::Column::Id.count(), "count")
        .group_by(project::Column::ProjectType)
        .into_tuple()
        .all(&state.db)
        .await?;

    Ok(Json(ProjectStatsResponse {
        total,
        by_status: status_counts
            .into_iter()
            .map(|(k, v)| (k, v as u64))
            .collect(),
        by_type: type_counts
            .into_iter()
            .map(|(k, v)| (k, v as u64))
            .collect(),
    }))
}

/// Visibility: owner, advisor, and admins. Deleted projects are admin-only.
pub fn check_project_access(auth_user: &AuthUser, model: &project::Model) -> Result<(), AppError> {
    if auth_user.has_role("admin") {
        return Ok(());
    }
    if !model.deleted
        && (model.student_id == auth_user.user_id || model.teacher_id == auth_user.user_id)
    {
        return Ok(());
    }
    Err(AppError::NotFound("Project not found".into()))
}

pub async fn find_project<C: ConnectionTrait>(db: &C, id: i32) -> Result<project::Model, AppError> {
    project::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

pub async fn find_project_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<project::Model, AppError> {
    use sea_orm::sea_query::LockType;
    project::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

async fn record_status_change(
    txn: &DatabaseTransaction,
    project_id: i32,
    old_status: &str,
    new_status: &str,
    reason: Option<&str>,
    changed_by: i32,
) -> Result<(), AppError> {
    project_status_history::ActiveModel {
        project_id: Set(project_id),
        old_status: Set(old_status.to_string()),
        new_status: Set(new_status.to_string()),
        change_reason: Set(reason.map(|r| r.to_string())),
        changed_by: Set(changed_by),
        changed_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await?;
    Ok(())
}
