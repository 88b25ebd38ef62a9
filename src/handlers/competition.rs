use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{
    competition, competition_judge, competition_registration, competition_result,
    competition_score, competition_submission,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::competition::{status, *};
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Competitions",
    operation_id = "createCompetition",
    summary = "Create a competition",
    description = "Competitions start in `draft` with registration closed; opening them is a separate step.",
    request_body = CreateCompetitionRequest,
    responses(
        (status = 201, description = "Competition created", body = CompetitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_competition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCompetitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_any_role(&["admin", "teacher"])?;
    validate_create_competition(&payload)?;

    let now = chrono::Utc::now();
    let model = competition::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        level: Set(payload.level),
        category: Set(payload.category),
        registration_start: Set(payload.registration_start),
        registration_end: Set(payload.registration_end),
        submission_start: Set(payload.submission_start),
        submission_end: Set(payload.submission_end),
        max_participants: Set(payload.max_participants.unwrap_or(0)),
        current_participants: Set(0),
        is_open: Set(false),
        status: Set(status::DRAFT.to_string()),
        created_by: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(CompetitionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Competitions",
    operation_id = "listCompetitions",
    summary = "List competitions with pagination and filters",
    description = "Draft competitions are only visible to admins and teachers.",
    params(CompetitionListQuery),
    responses(
        (status = 200, description = "List of competitions", body = CompetitionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_competitions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CompetitionListQuery>,
) -> Result<Json<CompetitionListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = competition::Entity::find();

    if !auth_user.has_role("admin") && !auth_user.has_role("teacher") {
        select = select.filter(competition::Column::Status.ne(status::DRAFT));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(competition::Column::Title)))
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
        select = select.filter(competition::Column::Status.eq(wanted.clone()));
    }
    if let Some(ref level) = query.level {
        if !LEVELS.contains(&level.as_str()) {
            return Err(AppError::Validation(format!(
                "level must be one of: {}",
                LEVELS.join(", ")
            )));
        }
        select = select.filter(competition::Column::Level.eq(level.clone()));
    }

    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match sort_by {
        "created_at" => competition::Column::CreatedAt,
        "title" => competition::Column::Title,
        "registration_end" => competition::Column::RegistrationEnd,
        "submission_end" => competition::Column::SubmissionEnd,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, title, registration_end, submission_end"
                    .into(),
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
        .column(competition::Column::Id)
        .column(competition::Column::Title)
        .column(competition::Column::Level)
        .column(competition::Column::RegistrationStart)
        .column(competition::Column::RegistrationEnd)
        .column(competition::Column::SubmissionEnd)
        .column(competition::Column::MaxParticipants)
        .column(competition::Column::CurrentParticipants)
        .column(competition::Column::IsOpen)
        .column(competition::Column::Status)
        .column(competition::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<CompetitionListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(CompetitionListResponse {
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
    tag = "Competitions",
    operation_id = "getCompetition",
    summary = "Get a competition with registration and submission counts",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Competition details", body = CompetitionDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_competition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CompetitionDetailResponse>, AppError> {
    let model = find_competition(&state.db, id).await?;
    if model.status == status::DRAFT
        && !auth_user.has_role("admin")
        && !auth_user.has_role("teacher")
    {
        return Err(AppError::NotFound("Competition not found".into()));
    }

    let registration_count = competition_registration::Entity::find()
        .filter(competition_registration::Column::CompetitionId.eq(id))
        .filter(competition_registration::Column::Status.ne("withdrawn"))
        .count(&state.db)
        .await?;
    let submission_count = competition_submission::Entity::find()
        .filter(competition_submission::Column::CompetitionId.eq(id))
        .count(&state.db)
        .await?;

    Ok(Json(CompetitionDetailResponse {
        competition: model.into(),
        registration_count,
        submission_count,
    }))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Competitions",
    operation_id = "updateCompetition",
    summary = "Update a competition",
    description = "Window ordering is re-validated against the merged result. Completed competitions are immutable.",
    params(("id" = i32, Path, description = "Competition ID")),
    request_body = UpdateCompetitionRequest,
    responses(
        (status = 200, description = "Competition updated", body = CompetitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Competition is completed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_competition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCompetitionRequest>,
) -> Result<Json<CompetitionResponse>, AppError> {
    auth_user.require_any_role(&["admin", "teacher"])?;
    validate_update_competition(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_competition_for_update(&txn, id).await?;
    if !auth_user.has_role("admin") && existing.created_by != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }
    if existing.status == status::COMPLETED {
        return Err(AppError::Conflict(
            "Completed competitions cannot be edited".into(),
        ));
    }

    let registration_start = payload
        .registration_start
        .unwrap_or(existing.registration_start);
    let registration_end = payload.registration_end.unwrap_or(existing.registration_end);
    let submission_start = payload.submission_start.unwrap_or(existing.submission_start);
    let submission_end = payload.submission_end.unwrap_or(existing.submission_end);
    if registration_end <= registration_start {
        return Err(AppError::Validation(
            "registration_end must be after registration_start".into(),
        ));
    }
    if submission_end <= submission_start {
        return Err(AppError::Validation(
            "submission_end must be after submission_start".into(),
        ));
    }
    if submission_start < registration_start {
        return Err(AppError::Validation(
            "submission_start must not precede registration_start".into(),
        ));
    }

    let mut active: competition::ActiveModel = existing.into();
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(level) = payload.level {
        active.level = Set(level);
    }
    if let Some(category) = payload.category {
        active.category = Set(Some(category));
    }
    active.registration_start = Set(registration_start);
    active.registration_end = Set(registration_end);
    active.submission_start = Set(submission_start);
    active.submission_end = Set(submission_end);
    if let Some(max) = payload.max_participants {
        active.max_participants = Set(max);
    }
    if let Some(new_status) = payload.status {
        active.status = Set(new_status);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/toggle-open",
    tag = "Competitions",
    operation_id = "toggleCompetitionOpen",
    summary = "Open or close registration",
    description = "Opening a draft competition also moves it to `registration`.",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Registration toggled", body = CompetitionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Competition is completed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn toggle_open(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CompetitionResponse>, AppError> {
    auth_user.require_any_role(&["admin", "teacher"])?;

    let txn = state.db.begin().await?;
    let existing = find_competition_for_update(&txn, id).await?;
    if !auth_user.has_role("admin") && existing.created_by != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }
    if existing.status == status::COMPLETED {
        return Err(AppError::Conflict(
            "Completed competitions cannot be reopened".into(),
        ));
    }

    let was_open = existing.is_open;
    let was_draft = existing.status == status::DRAFT;
    let mut active: competition::ActiveModel = existing.into();
    active.is_open = Set(!was_open);
    if !was_open && was_draft {
        active.status = Set(status::REGISTRATION.to_string());
    }
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Competitions",
    operation_id = "deleteCompetition",
    summary = "Delete a competition and everything attached to it",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 204, description = "Competition deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_competition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;

    let txn = state.db.begin().await?;
    let existing = find_competition_for_update(&txn, id).await?;

    competition_score::Entity::delete_many()
        .filter(
            competition_score::Column::SubmissionId.in_subquery(
                sea_orm::sea_query::Query::select()
                    .column(competition_submission::Column::Id)
                    .from(competition_submission::Entity)
                    .and_where(competition_submission::Column::CompetitionId.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;
    competition_result::Entity::delete_many()
        .filter(competition_result::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    competition_submission::Entity::delete_many()
        .filter(competition_submission::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    competition_judge::Entity::delete_many()
        .filter(competition_judge::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;
    competition_registration::Entity::delete_many()
        .filter(competition_registration::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;

    let active: competition::ActiveModel = existing.into();
    active.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Competitions",
    operation_id = "competitionStats",
    summary = "Aggregate competition counts",
    responses(
        (status = 200, description = "Competition statistics", body = CompetitionStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn competition_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CompetitionStatsResponse>, AppError> {
    auth_user.require_any_role(&["admin", "teacher"])?;

    let total = competition::Entity::find().count(&state.db).await?;
    let open = competition::Entity::find()
        .filter(competition::Column::IsOpen.eq(true))
        .count(&state.db)
        .await?;

    let status_counts: Vec<(String, i64)> = competition::Entity::find()
        .select_only()
        .column(competition::Column::Status)
        .column_as(competition::Column::Id.count(), "count")
        .group_by(competition::Column::Status)
        .into_tuple()
        .all(&state.db)
        .await?;

    let level_counts: Vec<(String, i64)> = competition::Entity::find()
        .select_only()
        .column(competition::Column::Level)
        .column_as(competition::Column::Id.count(), "count")
        .group_by(competition::Column::Level)
        .into_tuple()
        .all(&state.db)
        .await?;

    Ok(Json(CompetitionStatsResponse {
        total,
        open,
        by_status: status_counts
            .into_iter()
            .map(|(k, v)| (k, v as u64))
            .collect(),
        by_level: level_counts
            .into_iter()
            .map(|(k, v)| (k, v as u64))
            .collect(),
    }))
}

pub async fn find_competition<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<competition::Model, AppError> {
    competition::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Competition not found".into()))
}

pub async fn find_competition_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<competition::Model, AppError> {
    use sea_orm::sea_query::LockType;
    competition::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Competition not found".into()))
}
