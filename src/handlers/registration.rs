use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{competition, competition_registration, student_teacher};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::registration::*;
use crate::state::AppState;
use crate::utils::notify;

use super::competition::find_competition_for_update;

#[utoipa::path(
    post,
    path = "/{id}/registrations",
    tag = "Registrations",
    operation_id = "registerForCompetition",
    summary = "Register for a competition",
    description = "Registration must be open, inside the registration window, and under the participant cap. The capacity check and counter increment run under a row lock so concurrent registrations cannot oversubscribe.",
    params(("id" = i32, Path, description = "Competition ID")),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegistrationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Closed, full, or already registered (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn register(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("student")?;
    validate_register(&payload)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let comp = find_competition_for_update(&txn, id).await?;

    if !comp.is_open {
        return Err(AppError::Conflict("Registration is closed".into()));
    }
    if now < comp.registration_start || now > comp.registration_end {
        return Err(AppError::Conflict(
            "Outside the registration window".into(),
        ));
    }
    if comp.max_participants > 0 && comp.current_participants >= comp.max_participants {
        return Err(AppError::Conflict("Competition is full".into()));
    }

    let existing = competition_registration::Entity::find()
        .filter(competition_registration::Column::CompetitionId.eq(id))
        .filter(competition_registration::Column::StudentId.eq(auth_user.user_id))
        .filter(competition_registration::Column::Status.ne("withdrawn"))
        .count(&txn)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict("Already registered".into()));
    }

    let model = competition_registration::ActiveModel {
        competition_id: Set(id),
        student_id: Set(auth_user.user_id),
        team_name: Set(payload.team_name),
        contact_phone: Set(payload.contact_phone),
        contact_email: Set(payload.contact_email),
        status: Set("registered".to_string()),
        teacher_review_status: Set("pending".to_string()),
        registered_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let current = comp.current_participants;
    let mut comp_active: competition::ActiveModel = comp.into();
    comp_active.current_participants = Set(current + 1);
    comp_active.updated_at = Set(now);
    comp_active.update(&txn).await?;

    txn.commit().await?;
    Ok((StatusCode::CREATED, Json(RegistrationResponse::from(model))))
}

#[utoipa::path(
    delete,
    path = "/{id}/registrations/mine",
    tag = "Registrations",
    operation_id = "withdrawRegistration",
    summary = "Withdraw from a competition",
    description = "Marks the registration withdrawn and frees its capacity slot.",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Withdrawn", body = RegistrationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Registration not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Submission window already started (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn withdraw(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RegistrationResponse>, AppError> {
    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let comp = find_competition_for_update(&txn, id).await?;

    if now > comp.submission_start {
        return Err(AppError::Conflict(
            "Cannot withdraw once the submission window has started".into(),
        ));
    }

    let existing = competition_registration::Entity::find()
        .filter(competition_registration::Column::CompetitionId.eq(id))
        .filter(competition_registration::Column::StudentId.eq(auth_user.user_id))
        .filter(competition_registration::Column::Status.ne("withdrawn"))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Registration not found".into()))?;

    let mut active: competition_registration::ActiveModel = existing.into();
    active.status = Set("withdrawn".to_string());
    let model = active.update(&txn).await?;

    let current = comp.current_participants;
    let mut comp_active: competition::ActiveModel = comp.into();
    comp_active.current_participants = Set(Ord::max(current - 1, 0));
    comp_active.updated_at = Set(now);
    comp_active.update(&txn).await?;

    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/registrations/mine",
    tag = "Registrations",
    operation_id = "listMyRegistrations",
    summary = "List the caller's registrations across competitions",
    responses(
        (status = 200, description = "Registrations, newest first", body = Vec<RegistrationResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_my_registrations(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<RegistrationResponse>>, AppError> {
    let registrations = competition_registration::Entity::find()
        .filter(competition_registration::Column::StudentId.eq(auth_user.user_id))
        .order_by_desc(competition_registration::Column::RegisteredAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(registrations))
}

#[utoipa::path(
    get,
    path = "/{id}/registrations",
    tag = "Registrations",
    operation_id = "listRegistrations",
    summary = "List registrations for a competition",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Registrations, oldest first", body = Vec<RegistrationResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_registrations(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<RegistrationResponse>>, AppError> {
    auth_user.require_any_role(&["admin", "teacher"])?;
    super::competition::find_competition(&state.db, id).await?;

    let registrations = competition_registration::Entity::find()
        .filter(competition_registration::Column::CompetitionId.eq(id))
        .order_by_asc(competition_registration::Column::RegisteredAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(registrations))
}

#[utoipa::path(
    get,
    path = "/registrations/pending-review",
    tag = "Registrations",
    operation_id = "listRegistrationsPendingReview",
    summary = "List advisees' registrations awaiting the teacher's sign-off",
    responses(
        (status = 200, description = "Pending registrations", body = Vec<RegistrationResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_pending_reviews(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<RegistrationResponse>>, AppError> {
    auth_user.require_role("teacher")?;

    let registrations = competition_registration::Entity::find()
        .filter(competition_registration::Column::TeacherReviewStatus.eq("pending"))
        .filter(competition_registration::Column::Status.ne("withdrawn"))
        .filter(
            competition_registration::Column::StudentId.in_subquery(
                sea_orm::sea_query::Query::select()
                    .column(student_teacher::Column::StudentId)
                    .from(student_teacher::Entity)
                    .and_where(student_teacher::Column::TeacherId.eq(auth_user.user_id))
                    .to_owned(),
            ),
        )
        .order_by_asc(competition_registration::Column::RegisteredAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(registrations))
}

#[utoipa::path(
    post,
    path = "/{id}/registrations/{registration_id}/teacher-review",
    tag = "Registrations",
    operation_id = "teacherReviewRegistration",
    summary = "Advisor sign-off on a registration",
    description = "Only the student's advisor may sign off. Independent of the admin verification track.",
    params(
        ("id" = i32, Path, description = "Competition ID"),
        ("registration_id" = i32, Path, description = "Registration ID"),
    ),
    request_body = TeacherReviewRequest,
    responses(
        (status = 200, description = "Sign-off recorded", body = RegistrationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Registration not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already signed off (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, registration_id))]
pub async fn teacher_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, registration_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<TeacherReviewRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    auth_user.require_role("teacher")?;
    validate_verdict(&payload.verdict)?;

    let txn = state.db.begin().await?;
    let existing = find_registration_for_update(&txn, id, registration_id).await?;
    if !super::advisor::advises(&txn, auth_user.user_id, existing.student_id).await? {
        return Err(AppError::PermissionDenied);
    }
    if existing.teacher_review_status != "pending" {
        return Err(AppError::Conflict(
            "Registration already signed off".into(),
        ));
    }

    let student_id = existing.student_id;
    let mut active: competition_registration::ActiveModel = existing.into();
    active.teacher_review_status = Set(payload.verdict.clone());
    active.teacher_review_comment = Set(payload.comment.clone());
    active.teacher_review_time = Set(Some(chrono::Utc::now()));
    let model = active.update(&txn).await?;

    notify::notify(
        &txn,
        student_id,
        "registration_review",
        &format!("Registration {}", payload.verdict),
        &format!(
            "Your advisor {} your competition registration",
            payload.verdict
        ),
        "normal",
    )
    .await?;

    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/registrations/{registration_id}/verify",
    tag = "Registrations",
    operation_id = "verifyRegistration",
    summary = "Admin verification of a registration",
    description = "Approves or rejects a `registered` entry. Rejection frees the capacity slot.",
    params(
        ("id" = i32, Path, description = "Competition ID"),
        ("registration_id" = i32, Path, description = "Registration ID"),
    ),
    request_body = VerifyRegistrationRequest,
    responses(
        (status = 200, description = "Verification recorded", body = RegistrationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Registration not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Registration is not verifiable (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, registration_id))]
pub async fn verify_registration(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, registration_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<VerifyRegistrationRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    auth_user.require_role("admin")?;
    validate_verdict(&payload.verdict)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let comp = find_competition_for_update(&txn, id).await?;
    let existing = find_registration_for_update(&txn, id, registration_id).await?;
    if existing.status != "registered" {
        return Err(AppError::Conflict(
            "Only registered entries can be verified".into(),
        ));
    }

    let student_id = existing.student_id;
    let rejected = payload.verdict == "rejected";
    let mut active: competition_registration::ActiveModel = existing.into();
    active.status = Set(payload.verdict.clone());
    let model = active.update(&txn).await?;

    if rejected {
        let current = comp.current_participants;
        let mut comp_active: competition::ActiveModel = comp.into();
        comp_active.current_participants = Set(Ord::max(current - 1, 0));
        comp_active.updated_at = Set(now);
        comp_active.update(&txn).await?;
    }

    notify::notify(
        &txn,
        student_id,
        "registration_review",
        &format!("Registration {}", payload.verdict),
        &format!("Your competition registration was {}", payload.verdict),
        "normal",
    )
    .await?;

    txn.commit().await?;
    Ok(Json(model.into()))
}

async fn find_registration_for_update(
    txn: &DatabaseTransaction,
    competition_id: i32,
    registration_id: i32,
) -> Result<competition_registration::Model, AppError> {
    use sea_orm::sea_query::LockType;
    competition_registration::Entity::find_by_id(registration_id)
        .filter(competition_registration::Column::CompetitionId.eq(competition_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Registration not found".into()))
}
