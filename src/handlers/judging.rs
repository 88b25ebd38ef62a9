use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{
    competition, competition_judge, competition_registration, competition_result,
    competition_score, competition_submission,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::competition::status as competition_status;
use crate::models::judging::*;
use crate::state::AppState;
use crate::utils::{notify, upload};

use super::competition::{find_competition, find_competition_for_update};

#[utoipa::path(
    post,
    path = "/{id}/submissions",
    tag = "Judging",
    operation_id = "submitEntry",
    summary = "Submit a competition entry",
    description = "Multipart form with a `file` part and an optional `description` text part. Requires a live registration and an open submission window. Each upload becomes a new version; a locked latest version rejects further uploads.",
    params(("id" = i32, Path, description = "Competition ID")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Entry stored", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Window closed, no registration, or locked (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id))]
pub async fn submit_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("student")?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let comp = find_competition_for_update(&txn, id).await?;

    if now < comp.submission_start || now > comp.submission_end {
        return Err(AppError::Conflict("Outside the submission window".into()));
    }

    let registered = competition_registration::Entity::find()
        .filter(competition_registration::Column::CompetitionId.eq(id))
        .filter(competition_registration::Column::StudentId.eq(auth_user.user_id))
        .filter(competition_registration::Column::Status.is_in(["registered", "approved"]))
        .count(&txn)
        .await?;
    if registered == 0 {
        return Err(AppError::Conflict(
            "No live registration for this competition".into(),
        ));
    }

    let latest = competition_submission::Entity::find()
        .filter(competition_submission::Column::CompetitionId.eq(id))
        .filter(competition_submission::Column::StudentId.eq(auth_user.user_id))
        .order_by_desc(competition_submission::Column::Version)
        .one(&txn)
        .await?;
    if let Some(ref prev) = latest
        && prev.locked
    {
        return Err(AppError::Conflict(
            "Submission is locked; no further versions accepted".into(),
        ));
    }
    let version = latest.map(|s| s.version).unwrap_or(0) + 1;

    let mut description: Option<String> = None;
    let mut stored: Option<upload::StoredFile> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("description") => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?,
                );
            }
            Some("file") => {
                stored = Some(
                    upload::store_field(
                        field,
                        &state.config.storage.uploads_dir,
                        &format!("competitions/{id}"),
                        state.config.storage.max_upload_size,
                    )
                    .await?,
                );
            }
            _ => {}
        }
    }
    let stored = stored.ok_or_else(|| AppError::Validation("Missing `file` field".into()))?;
    let stored_path = stored.path.clone();

    // Past this point a failed insert or commit must not leave the file behind.
    let result = async {
        let model = competition_submission::ActiveModel {
            competition_id: Set(id),
            student_id: Set(auth_user.user_id),
            file_name: Set(stored.file_name),
            file_path: Set(stored.path.to_string_lossy().to_string()),
            file_size: Set(stored.size),
            description: Set(description),
            version: Set(version),
            status: Set("submitted".to_string()),
            locked: Set(false),
            submitted_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok::<competition_submission::Model, AppError>(model)
    }
    .await;

    let model = match result {
        Ok(model) => model,
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&stored_path).await {
                tracing::warn!(
                    path = %stored_path.display(),
                    error = %remove_err,
                    "Failed to remove stored file after aborted submission"
                );
            }
            return Err(e);
        }
    };

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/submissions/mine",
    tag = "Judging",
    operation_id = "listMySubmissions",
    summary = "List the caller's submissions across competitions",
    responses(
        (status = 200, description = "Submissions, newest first", body = Vec<SubmissionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_my_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    let submissions = competition_submission::Entity::find()
        .filter(competition_submission::Column::StudentId.eq(auth_user.user_id))
        .order_by_desc(competition_submission::Column::SubmittedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(submissions))
}

#[utoipa::path(
    get,
    path = "/{id}/submissions",
    tag = "Judging",
    operation_id = "listSubmissions",
    summary = "List submissions for a competition",
    description = "Admins and the competition's judges see all entries.",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Submissions, oldest first", body = Vec<SubmissionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    find_competition(&state.db, id).await?;
    if !auth_user.has_role("admin") && !is_active_judge(&state.db, id, auth_user.user_id).await? {
        return Err(AppError::PermissionDenied);
    }

    let submissions = competition_submission::Entity::find()
        .filter(competition_submission::Column::CompetitionId.eq(id))
        .order_by_asc(competition_submission::Column::SubmittedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(submissions))
}

#[utoipa::path(
    post,
    path = "/{id}/judges",
    tag = "Judging",
    operation_id = "assignJudge",
    summary = "Assign a teacher as judge",
    description = "Re-assigning a previously deactivated judge reactivates them.",
    params(("id" = i32, Path, description = "Competition ID")),
    request_body = AssignJudgeRequest,
    responses(
        (status = 201, description = "Judge assigned", body = JudgeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition or teacher not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn assign_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AssignJudgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;

    find_competition(&state.db, id).await?;
    super::user::find_user(&state.db, payload.teacher_id).await?;
    if !super::advisor::has_role(&state.db, payload.teacher_id, "teacher").await? {
        return Err(AppError::Validation("Named user is not a teacher".into()));
    }

    let existing = competition_judge::Entity::find_by_id((id, payload.teacher_id))
        .one(&state.db)
        .await?;

    let model = match existing {
        Some(judge) => {
            let mut active: competition_judge::ActiveModel = judge.into();
            active.status = Set("active".to_string());
            active.update(&state.db).await?
        }
        None => {
            competition_judge::ActiveModel {
                competition_id: Set(id),
                teacher_id: Set(payload.teacher_id),
                status: Set("active".to_string()),
                assigned_at: Set(chrono::Utc::now()),
            }
            .insert(&state.db)
            .await?
        }
    };

    Ok((StatusCode::CREATED, Json(JudgeResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}/judges",
    tag = "Judging",
    operation_id = "listJudges",
    summary = "List judges assigned to a competition",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Judges", body = Vec<JudgeResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_judges(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<JudgeResponse>>, AppError> {
    auth_user.require_any_role(&["admin", "teacher"])?;
    find_competition(&state.db, id).await?;

    let judges = competition_judge::Entity::find()
        .filter(competition_judge::Column::CompetitionId.eq(id))
        .order_by_asc(competition_judge::Column::AssignedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(judges))
}

#[utoipa::path(
    delete,
    path = "/{id}/judges/{teacher_id}",
    tag = "Judging",
    operation_id = "deactivateJudge",
    summary = "Deactivate a judge",
    description = "The assignment row is kept so past scores stay attributable.",
    params(
        ("id" = i32, Path, description = "Competition ID"),
        ("teacher_id" = i32, Path, description = "Teacher user ID"),
    ),
    responses(
        (status = 200, description = "Judge deactivated", body = JudgeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Judge not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, teacher_id))]
pub async fn deactivate_judge(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, teacher_id)): Path<(i32, i32)>,
) -> Result<Json<JudgeResponse>, AppError> {
    auth_user.require_role("admin")?;

    let judge = competition_judge::Entity::find_by_id((id, teacher_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Judge not found".into()))?;

    let mut active: competition_judge::ActiveModel = judge.into();
    active.status = Set("inactive".to_string());
    let model = active.update(&state.db).await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/submissions/{submission_id}/scores",
    tag = "Judging",
    operation_id = "submitScore",
    summary = "Score a submission",
    description = "One score per (submission, judge); re-scoring updates the existing row. Only active judges of the competition may score, and locked submissions reject new scores.",
    params(
        ("id" = i32, Path, description = "Competition ID"),
        ("submission_id" = i32, Path, description = "Submission ID"),
    ),
    request_body = ScoreRequest,
    responses(
        (status = 200, description = "Score recorded", body = ScoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition or submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Submission is locked (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, submission_id))]
pub async fn submit_score(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, submission_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    validate_score(&payload)?;

    if !auth_user.has_role("admin") && !is_active_judge(&state.db, id, auth_user.user_id).await? {
        return Err(AppError::PermissionDenied);
    }

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let submission = find_submission_for_update(&txn, id, submission_id).await?;
    if submission.locked {
        return Err(AppError::Conflict(
            "Submission is locked; scoring is closed".into(),
        ));
    }

    let existing = competition_score::Entity::find_by_id((submission_id, auth_user.user_id))
        .one(&txn)
        .await?;

    let model = match existing {
        Some(score) => {
            let mut active: competition_score::ActiveModel = score.into();
            active.score = Set(payload.score);
            active.comment = Set(payload.comment.clone());
            active.scored_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            competition_score::ActiveModel {
                submission_id: Set(submission_id),
                judge_id: Set(auth_user.user_id),
                score: Set(payload.score),
                comment: Set(payload.comment.clone()),
                scored_at: Set(now),
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/{id}/submissions/{submission_id}/scores",
    tag = "Judging",
    operation_id = "listScores",
    summary = "List scores for a submission",
    params(
        ("id" = i32, Path, description = "Competition ID"),
        ("submission_id" = i32, Path, description = "Submission ID"),
    ),
    responses(
        (status = 200, description = "Scores", body = Vec<ScoreResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition or submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, submission_id))]
pub async fn list_scores(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, submission_id)): Path<(i32, i32)>,
) -> Result<Json<Vec<ScoreResponse>>, AppError> {
    if !auth_user.has_role("admin") && !is_active_judge(&state.db, id, auth_user.user_id).await? {
        return Err(AppError::PermissionDenied);
    }
    find_submission(&state.db, id, submission_id).await?;

    let scores = competition_score::Entity::find()
        .filter(competition_score::Column::SubmissionId.eq(submission_id))
        .order_by_asc(competition_score::Column::ScoredAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(scores))
}

#[utoipa::path(
    get,
    path = "/{id}/judging-progress",
    tag = "Judging",
    operation_id = "judgingProgress",
    summary = "Scoring completion for a competition",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Progress counts", body = JudgingProgressResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn judging_progress(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<JudgingProgressResponse>, AppError> {
    auth_user.require_any_role(&["admin", "teacher"])?;
    find_competition(&state.db, id).await?;

    let total_submissions = competition_submission::Entity::find()
        .filter(competition_submission::Column::CompetitionId.eq(id))
        .count(&state.db)
        .await?;

    let scored_submissions = competition_score::Entity::find()
        .filter(
            competition_score::Column::SubmissionId.in_subquery(
                sea_orm::sea_query::Query::select()
                    .column(competition_submission::Column::Id)
                    .from(competition_submission::Entity)
                    .and_where(competition_submission::Column::CompetitionId.eq(id))
                    .to_owned(),
            ),
        )
        .select_only()
        .column(competition_score::Column::SubmissionId)
        .group_by(competition_score::Column::SubmissionId)
        .into_tuple::<i32>()
        .all(&state.db)
        .await?
        .len() as u64;

    Ok(Json(JudgingProgressResponse {
        total_submissions,
        scored_submissions,
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/results",
    tag = "Judging",
    operation_id = "registerResult",
    summary = "Record an award for a submission",
    params(("id" = i32, Path, description = "Competition ID")),
    request_body = RegisterResultRequest,
    responses(
        (status = 201, description = "Result recorded", body = ResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition or submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Submission already has a result (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn register_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RegisterResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;
    validate_register_result(&payload)?;

    find_competition(&state.db, id).await?;
    let submission = find_submission(&state.db, id, payload.submission_id).await?;

    let duplicate = competition_result::Entity::find()
        .filter(competition_result::Column::SubmissionId.eq(payload.submission_id))
        .count(&state.db)
        .await?;
    if duplicate > 0 {
        return Err(AppError::Conflict(
            "Submission already has a recorded result".into(),
        ));
    }

    let model = competition_result::ActiveModel {
        competition_id: Set(id),
        student_id: Set(submission.student_id),
        submission_id: Set(payload.submission_id),
        award_level: Set(payload.award_level),
        final_score: Set(payload.final_score),
        certificate_url: Set(payload.certificate_url),
        created_by: Set(auth_user.user_id),
        published_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ResultResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}/results",
    tag = "Judging",
    operation_id = "listResults",
    summary = "List recorded awards for a competition",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Results", body = Vec<ResultResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ResultResponse>>, AppError> {
    find_competition(&state.db, id).await?;

    let mut select =
        competition_result::Entity::find().filter(competition_result::Column::CompetitionId.eq(id));

    // Students only see their own awards until results are finalized.
    if !auth_user.has_role("admin") && !auth_user.has_role("teacher") {
        select = select.filter(
            Condition::any()
                .add(competition_result::Column::StudentId.eq(auth_user.user_id))
                .add(competition_result::Column::FinalizedAt.is_not_null()),
        );
    }

    let results = select
        .order_by_desc(competition_result::Column::PublishedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(results))
}

#[utoipa::path(
    post,
    path = "/{id}/finalize",
    tag = "Judging",
    operation_id = "finalizeResults",
    summary = "Finalize a competition",
    description = "Stamps every unfinalized result, locks all submissions, moves the competition to `completed`, and notifies the awardees. Idempotent for already-stamped results.",
    params(("id" = i32, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Competition finalized", body = Vec<ResultResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn finalize_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ResultResponse>>, AppError> {
    auth_user.require_role("admin")?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let comp = find_competition_for_update(&txn, id).await?;

    competition_result::Entity::update_many()
        .col_expr(
            competition_result::Column::FinalizedBy,
            Expr::value(Some(auth_user.user_id)),
        )
        .col_expr(
            competition_result::Column::FinalizedAt,
            Expr::value(Some(now)),
        )
        .filter(competition_result::Column::CompetitionId.eq(id))
        .filter(competition_result::Column::FinalizedAt.is_null())
        .exec(&txn)
        .await?;

    competition_submission::Entity::update_many()
        .col_expr(competition_submission::Column::Locked, Expr::value(true))
        .filter(competition_submission::Column::CompetitionId.eq(id))
        .exec(&txn)
        .await?;

    let title = comp.title.clone();
    let mut comp_active: competition::ActiveModel = comp.into();
    comp_active.status = Set(competition_status::COMPLETED.to_string());
    comp_active.is_open = Set(false);
    comp_active.updated_at = Set(now);
    comp_active.update(&txn).await?;

    let results = competition_result::Entity::find()
        .filter(competition_result::Column::CompetitionId.eq(id))
        .order_by_desc(competition_result::Column::PublishedAt)
        .all(&txn)
        .await?;

    for result in &results {
        notify::notify(
            &txn,
            result.student_id,
            "competition_result",
            "Competition results published",
            &format!(
                "You received {} in \"{}\"",
                result.award_level, title
            ),
            "high",
        )
        .await?;
    }

    txn.commit().await?;
    Ok(Json(results.into_iter().map(Into::into).collect()))
}

async fn is_active_judge<C: ConnectionTrait>(
    db: &C,
    competition_id: i32,
    teacher_id: i32,
) -> Result<bool, AppError> {
    Ok(
        competition_judge::Entity::find_by_id((competition_id, teacher_id))
            .one(db)
            .await?
            .is_some_and(|j| j.status == "active"),
    )
}

async fn find_submission<C: ConnectionTrait>(
    db: &C,
    competition_id: i32,
    submission_id: i32,
) -> Result<competition_submission::Model, AppError> {
    competition_submission::Entity::find_by_id(submission_id)
        .filter(competition_submission::Column::CompetitionId.eq(competition_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))
}

async fn find_submission_for_update(
    txn: &DatabaseTransaction,
    competition_id: i32,
    submission_id: i32,
) -> Result<competition_submission::Model, AppError> {
    use sea_orm::sea_query::LockType;
    competition_submission::Entity::find_by_id(submission_id)
        .filter(competition_submission::Column::CompetitionId.eq(competition_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))
}
