use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use sea_orm::*;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::project_file;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::file::*;
use crate::state::AppState;
use crate::utils::{notify, upload};

use super::project::{check_project_access, find_project};

/// Body cap for multipart routes. The per-file limit from config is enforced
/// while streaming; this only bounds the request as a whole.
pub fn upload_body_limit() -> axum::extract::DefaultBodyLimit {
    axum::extract::DefaultBodyLimit::max(256 * 1024 * 1024)
}

#[utoipa::path(
    post,
    path = "/{id}/files",
    tag = "Project files",
    operation_id = "uploadProjectFile",
    summary = "Upload a project deliverable",
    description = "Multipart form with a `file` part and a `file_type` text part. Versions count up per (project, file_type) and the file enters review as `pending`. The advising teacher is notified.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = ProjectFileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id))]
pub async fn upload_project_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let project = find_project(&state.db, id).await?;
    if project.student_id != auth_user.user_id || project.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }

    let mut file_type: Option<String> = None;
    let mut stored: Option<upload::StoredFile> = None;
    let mut is_public = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("file_type") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
                file_type = Some(value);
            }
            Some("is_public") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
                is_public = value == "true";
            }
            Some("file") => {
                stored = Some(
                    upload::store_field(
                        field,
                        &state.config.storage.uploads_dir,
                        &format!("projects/{id}"),
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

    // Everything past storage must either commit or leave no file behind.
    let result = async {
        let file_type =
            file_type.ok_or_else(|| AppError::Validation("Missing `file_type` field".into()))?;
        validate_file_type(&file_type)?;

        let txn = state.db.begin().await?;

        let latest_version: Option<i32> = project_file::Entity::find()
            .filter(project_file::Column::ProjectId.eq(id))
            .filter(project_file::Column::FileType.eq(file_type.clone()))
            .select_only()
            .column_as(project_file::Column::FileVersion.max(), "max_version")
            .into_tuple()
            .one(&txn)
            .await?
            .flatten();

        let model = project_file::ActiveModel {
            project_id: Set(id),
            file_name: Set(stored.file_name),
            file_path: Set(stored.path.to_string_lossy().to_string()),
            file_type: Set(file_type.clone()),
            file_version: Set(latest_version.unwrap_or(0) + 1),
            file_size: Set(stored.size),
            review_status: Set("pending".to_string()),
            is_public: Set(is_public),
            uploaded_by: Set(auth_user.user_id),
            uploaded_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        notify::notify(
            &txn,
            project.teacher_id,
            "file_review",
            "File uploaded for review",
            &format!(
                "Project \"{}\" has a new {} file awaiting review",
                project.title, file_type
            ),
            "normal",
        )
        .await?;

        txn.commit().await?;
        Ok::<project_file::Model, AppError>(model)
    }
    .await;

    let model = match result {
        Ok(model) => model,
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&stored_path).await {
                tracing::warn!(
                    path = %stored_path.display(),
                    error = %remove_err,
                    "Failed to remove stored file after aborted upload"
                );
            }
            return Err(e);
        }
    };

    Ok((StatusCode::CREATED, Json(ProjectFileResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}/files",
    tag = "Project files",
    operation_id = "listProjectFiles",
    summary = "List files attached to a project",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Files, newest upload first", body = Vec<ProjectFileResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_project_files(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ProjectFileResponse>>, AppError> {
    let project = find_project(&state.db, id).await?;
    check_project_access(&auth_user, &project)?;

    let files = project_file::Entity::find()
        .filter(project_file::Column::ProjectId.eq(id))
        .order_by_desc(project_file::Column::UploadedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(files))
}

#[utoipa::path(
    get,
    path = "/{id}/files/{file_id}/download",
    tag = "Project files",
    operation_id = "downloadProjectFile",
    summary = "Download a project file",
    description = "Streams the stored file as an attachment. Public files are readable by any authenticated user; others follow project visibility.",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("file_id" = i32, Path, description = "File ID"),
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project or file not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, file_id))]
pub async fn download_project_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, file_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let project = find_project(&state.db, id).await?;
    let record = find_file(&state.db, id, file_id).await?;

    if !record.is_public {
        check_project_access(&auth_user, &project)?;
    }

    let file = tokio::fs::File::open(&record.file_path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to open stored file: {e}")))?;

    let mime = mime_guess::from_path(&record.file_name).first_or_octet_stream();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        record.file_name.replace('"', "")
    );

    let headers = [
        (header::CONTENT_TYPE, mime.to_string()),
        (header::CONTENT_DISPOSITION, disposition),
        (header::CONTENT_LENGTH, record.file_size.to_string()),
    ];

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((headers, body))
}

#[utoipa::path(
    post,
    path = "/{id}/files/{file_id}/review",
    tag = "Project files",
    operation_id = "reviewProjectFile",
    summary = "Review an uploaded file",
    description = "The advising teacher (or an admin) approves or rejects a pending file. The uploader is notified.",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("file_id" = i32, Path, description = "File ID"),
    ),
    request_body = ReviewFileRequest,
    responses(
        (status = 200, description = "Review applied", body = ProjectFileResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project or file not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "File already reviewed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, file_id))]
pub async fn review_project_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, file_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<ReviewFileRequest>,
) -> Result<Json<ProjectFileResponse>, AppError> {
    auth_user.require_any_role(&["teacher", "admin"])?;
    validate_review_file(&payload)?;

    let project = find_project(&state.db, id).await?;
    if !auth_user.has_role("admin") && project.teacher_id != auth_user.user_id {
        return Err(AppError::NotFound("Project not found".into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_file_for_update(&txn, id, file_id).await?;
    if existing.review_status != "pending" {
        return Err(AppError::Conflict("File already reviewed".into()));
    }

    let uploaded_by = existing.uploaded_by;
    let file_name = existing.file_name.clone();
    let mut active: project_file::ActiveModel = existing.into();
    active.review_status = Set(payload.verdict.clone());
    active.review_comments = Set(payload.comments.clone());
    active.reviewed_by = Set(Some(auth_user.user_id));
    active.reviewed_at = Set(Some(chrono::Utc::now()));
    let model = active.update(&txn).await?;

    notify::notify(
        &txn,
        uploaded_by,
        "file_review",
        &format!("File {}", payload.verdict),
        &format!("Your file \"{}\" was {}", file_name, payload.verdict),
        "normal",
    )
    .await?;

    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}/files/{file_id}",
    tag = "Project files",
    operation_id = "deleteProjectFile",
    summary = "Delete a file that has not been reviewed yet",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("file_id" = i32, Path, description = "File ID"),
    ),
    responses(
        (status = 204, description = "File deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project or file not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Reviewed files cannot be deleted (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, file_id))]
pub async fn delete_project_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, file_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let project = find_project(&state.db, id).await?;
    if project.deleted {
        return Err(AppError::NotFound("Project not found".into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_file_for_update(&txn, id, file_id).await?;
    if existing.uploaded_by != auth_user.user_id && !auth_user.has_role("admin") {
        return Err(AppError::NotFound("File not found".into()));
    }
    if existing.review_status != "pending" && !auth_user.has_role("admin") {
        return Err(AppError::Conflict(
            "Files that have been reviewed cannot be deleted".into(),
        ));
    }

    let path = existing.file_path.clone();
    let active: project_file::ActiveModel = existing.into();
    active.delete(&txn).await?;
    txn.commit().await?;

    // Disk cleanup is best effort; a dangling file is harmless.
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path, error = %e, "Failed to remove stored file");
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn find_file<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    file_id: i32,
) -> Result<project_file::Model, AppError> {
    project_file::Entity::find_by_id(file_id)
        .filter(project_file::Column::ProjectId.eq(project_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))
}

async fn find_file_for_update(
    txn: &DatabaseTransaction,
    project_id: i32,
    file_id: i32,
) -> Result<project_file::Model, AppError> {
    use sea_orm::sea_query::LockType;
    project_file::Entity::find_by_id(file_id)
        .filter(project_file::Column::ProjectId.eq(project_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))
}
