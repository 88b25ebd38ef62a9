use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{user, user_profile, user_role};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, escape_like};
use crate::models::user::*;
use crate::state::AppState;
use crate::utils::hash;

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users with pagination and filters",
    description = "Paginated user listing with search over username/email, and filters on role, status, and department. Requires the `admin` role.",
    params(UserListQuery),
    responses(
        (status = 200, description = "List of users", body = UserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require_role("admin")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = user::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Email)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
    }

    if let Some(ref role) = query.role {
        select = select.filter(
            user::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(user_role::Column::UserId)
                    .from(user_role::Entity)
                    .and_where(user_role::Column::RoleKey.eq(role.clone()))
                    .to_owned(),
            ),
        );
    }
    if let Some(ref status) = query.status {
        select = select.filter(user::Column::Status.eq(status.clone()));
    }
    if let Some(ref department) = query.department {
        select = select.filter(user::Column::Department.eq(department.clone()));
    }

    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match sort_by {
        "created_at" => user::Column::CreatedAt,
        "username" => user::Column::Username,
        "department" => user::Column::Department,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, username, department".into(),
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
        .column(user::Column::Id)
        .column(user::Column::Username)
        .column(user::Column::Email)
        .column(user::Column::Status)
        .column(user::Column::Department)
        .column(user::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<UserListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(UserListResponse {
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
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a user with profile and roles",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserDetailResponse>, AppError> {
    // Users may view their own detail; everything else is admin-only.
    if auth_user.user_id != id {
        auth_user.require_role("admin")?;
    }

    let user = find_user(&state.db, id).await?;
    Ok(Json(user_detail(&state.db, user).await?))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user with roles and profile fields",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Username or email taken (USERNAME_TAKEN, CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(username = %payload.username))]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;
    validate_create_user(&payload)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let new_user = user::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        password: Set(hash),
        email: Set(payload.email.trim().to_string()),
        status: Set("active".to_string()),
        department: Set(payload.department),
        title: Set(payload.title),
        grade: Set(payload.grade),
        major: Set(payload.major),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let user = new_user.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            if detail.contains("email") {
                AppError::Conflict("Email is already registered".into())
            } else {
                AppError::UsernameTaken
            }
        }
        _ => AppError::from(e),
    })?;

    for role in &payload.roles {
        user_role::ActiveModel {
            user_id: Set(user.id),
            role_key: Set(role.clone()),
        }
        .insert(&txn)
        .await?;
    }

    user_profile::ActiveModel {
        user_id: Set(user.id),
        real_name: Set(payload.real_name),
        phone: Set(payload.phone),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    let detail = user_detail(&state.db, user).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a user and their profile",
    description = "PATCH semantics: absent fields are untouched, null clears nullable fields, roles replace the full role set.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserDetailResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserDetailResponse>, AppError> {
    auth_user.require_role("admin")?;
    validate_update_user(&payload)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;
    let existing = find_user_for_update(&txn, id).await?;

    let mut active: user::ActiveModel = existing.into();
    if let Some(ref email) = payload.email {
        active.email = Set(email.trim().to_string());
    }
    if let Some(ref status) = payload.status {
        active.status = Set(status.clone());
    }
    if let Some(department) = payload.department {
        active.department = Set(department);
    }
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(grade) = payload.grade {
        active.grade = Set(grade);
    }
    if let Some(major) = payload.major {
        active.major = Set(major);
    }
    active.updated_at = Set(now);
    let user = active.update(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Email is already registered".into())
        }
        _ => AppError::from(e),
    })?;

    if let Some(ref roles) = payload.roles {
        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        for role in roles {
            user_role::ActiveModel {
                user_id: Set(id),
                role_key: Set(role.clone()),
            }
            .insert(&txn)
            .await?;
        }
    }

    let profile = user_profile::Entity::find_by_id(id).one(&txn).await?;
    let profile_exists = profile.is_some();
    let mut profile_active: user_profile::ActiveModel = match profile {
        Some(p) => p.into(),
        None => user_profile::ActiveModel {
            user_id: Set(id),
            ..Default::default()
        },
    };
    if let Some(real_name) = payload.real_name {
        profile_active.real_name = Set(real_name);
    }
    if let Some(phone) = payload.phone {
        profile_active.phone = Set(phone);
    }
    if let Some(bio) = payload.bio {
        profile_active.bio = Set(bio);
    }
    if let Some(interests) = payload.interests {
        profile_active.interests = Set(Some(serde_json::json!(interests)));
    }
    profile_active.updated_at = Set(now);
    if profile_exists {
        profile_active.update(&txn).await?;
    } else {
        profile_active.insert(&txn).await?;
    }

    txn.commit().await?;

    Ok(Json(user_detail(&state.db, user).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a user",
    description = "Removes the account along with its roles and profile. Admins cannot delete themselves.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete own account (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;

    if id == auth_user.user_id {
        return Err(AppError::Validation("Cannot delete your own account".into()));
    }

    let txn = state.db.begin().await?;
    let user = find_user_for_update(&txn, id).await?;

    user_role::Entity::delete_many()
        .filter(user_role::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    user_profile::Entity::delete_many()
        .filter(user_profile::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    let active: user::ActiveModel = user.into();
    active.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/toggle-status",
    tag = "Users",
    operation_id = "toggleUserStatus",
    summary = "Toggle a user between active and inactive",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Status toggled", body = UserDetailResponse),
        (status = 400, description = "Cannot disable own account (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn toggle_user_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserDetailResponse>, AppError> {
    auth_user.require_role("admin")?;

    if id == auth_user.user_id {
        return Err(AppError::Validation(
            "Cannot disable your own account".into(),
        ));
    }

    let txn = state.db.begin().await?;
    let user = find_user_for_update(&txn, id).await?;

    let next = if user.status == "active" {
        "inactive"
    } else {
        "active"
    };
    let mut active: user::ActiveModel = user.into();
    active.status = Set(next.to_string());
    active.updated_at = Set(chrono::Utc::now());
    let user = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(user_detail(&state.db, user).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/reset-password",
    tag = "Users",
    operation_id = "resetUserPassword",
    summary = "Reset a user's password",
    params(("id" = i32, Path, description = "User ID")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Password reset"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn reset_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("admin")?;

    if payload.new_password.len() < 8 || payload.new_password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }

    let user = find_user(&state.db, id).await?;
    let hash = hash::hash_password(&payload.new_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let mut active: user::ActiveModel = user.into();
    active.password = Set(hash);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Users",
    operation_id = "userStats",
    summary = "Aggregate user counts",
    responses(
        (status = 200, description = "User statistics", body = UserStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn user_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserStatsResponse>, AppError> {
    auth_user.require_role("admin")?;

    let total = user::Entity::find().count(&state.db).await?;
    let active = user::Entity::find()
        .filter(user::Column::Status.eq("active"))
        .count(&state.db)
        .await?;

    let mut by_role = std::collections::BTreeMap::new();
    for &role in ROLE_KEYS {
        let count = user_role::Entity::find()
            .filter(user_role::Column::RoleKey.eq(role))
            .count(&state.db)
            .await?;
        by_role.insert(role.to_string(), count);
    }

    let dept_counts: Vec<(Option<String>, i64)> = user::Entity::find()
        .select_only()
        .column(user::Column::Department)
        .column_as(user::Column::Id.count(), "count")
        .group_by(user::Column::Department)
        .into_tuple()
        .all(&state.db)
        .await?;
    let by_department = dept_counts
        .into_iter()
        .map(|(dept, count)| (dept.unwrap_or_default(), count as u64))
        .collect();

    Ok(Json(UserStatsResponse {
        total,
        active,
        inactive: total - active,
        by_role,
        by_department,
    }))
}

pub async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn find_user_for_update(txn: &DatabaseTransaction, id: i32) -> Result<user::Model, AppError> {
    use sea_orm::sea_query::LockType;
    user::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn user_detail(
    db: &DatabaseConnection,
    user: user::Model,
) -> Result<UserDetailResponse, AppError> {
    let roles: Vec<String> = user_role::Entity::find()
        .filter(user_role::Column::UserId.eq(user.id))
        .all(db)
        .await?
        .into_iter()
        .map(|ur| ur.role_key)
        .collect();

    let profile = user_profile::Entity::find_by_id(user.id).one(db).await?;
    let (real_name, phone, student_no, avatar, bio, interests, last_login) = match profile {
        Some(p) => {
            let interests = p
                .interests
                .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
                .unwrap_or_default();
            (
                p.real_name,
                p.phone,
                p.student_no,
                p.avatar,
                p.bio,
                interests,
                p.last_login,
            )
        }
        None => (None, None, None, None, None, Vec::new(), None),
    };

    Ok(UserDetailResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        status: user.status,
        roles,
        department: user.department,
        title: user.title,
        grade: user.grade,
        major: user.major,
        real_name,
        phone,
        student_no,
        avatar,
        bio,
        interests,
        last_login,
        created_at: user.created_at,
        updated_at: user.updated_at,
    })
}
