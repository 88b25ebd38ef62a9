use std::net::SocketAddr;

use axum::http::HeaderMap;
use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{login_log, role, user, user_profile, user_role};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse,
    validate_login_request, validate_register_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt, net};

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a new account",
    description = "Creates a user account with the default `student` role and an empty profile.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username or email already taken (USERNAME_TAKEN, CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_string();

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let new_user = user::ActiveModel {
        username: Set(username),
        password: Set(hash),
        email: Set(email),
        status: Set("active".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let user = new_user.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            if detail.contains("email") {
                AppError::Conflict("Email is already registered".into())
            } else {
                tracing::debug!("Registration race condition: unique constraint caught on insert");
                AppError::UsernameTaken
            }
        }
        _ => AppError::from(e),
    })?;

    user_role::ActiveModel {
        user_id: Set(user.id),
        role_key: Set(role::DEFAULT_ROLE.to_string()),
    }
    .insert(&txn)
    .await?;

    user_profile::ActiveModel {
        user_id: Set(user.id),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in and receive a JWT",
    description = "Verifies credentials, records a login log row, stamps the profile's last_login, and returns a bearer token carrying the user's roles. Disabled accounts are rejected.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Bad credentials (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 403, description = "Account disabled (ACCOUNT_DISABLED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload, headers), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let username = payload.username.trim();

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    if user.status != "active" {
        return Err(AppError::AccountDisabled);
    }

    let roles: Vec<String> = user_role::Entity::find()
        .filter(user_role::Column::UserId.eq(user.id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|ur| ur.role_key)
        .collect();

    let now = chrono::Utc::now();
    let user_agent = headers
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    login_log::ActiveModel {
        user_id: Set(user.id),
        ip_address: Set(Some(net::client_ip(&headers, peer))),
        user_agent: Set(user_agent),
        login_time: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    user_profile::Entity::update_many()
        .col_expr(user_profile::Column::LastLogin, Expr::value(Some(now)))
        .filter(user_profile::Column::UserId.eq(user.id))
        .exec(&state.db)
        .await?;

    let token = jwt::sign(
        user.id,
        &user.username,
        roles.clone(),
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_days,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        roles,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current authenticated user",
    responses(
        (status = 200, description = "Current claims", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.user_id,
        username: auth_user.username,
        roles: auth_user.roles,
    })
}
