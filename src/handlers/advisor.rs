use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{student_teacher, user, user_role};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::advisor::*;
use crate::models::shared::escape_like;
use crate::state::AppState;
use crate::utils::notify;

#[utoipa::path(
    get,
    path = "/teachers",
    tag = "Advisors",
    operation_id = "listTeachers",
    summary = "List teachers available as advisors",
    params(TeacherListQuery),
    responses(
        (status = 200, description = "List of teachers", body = Vec<TeacherListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_teachers(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TeacherListQuery>,
) -> Result<Json<Vec<TeacherListItem>>, AppError> {
    let mut select = user::Entity::find()
        .filter(user::Column::Status.eq("active"))
        .filter(
            user::Column::Id.in_subquery(
                sea_orm::sea_query::Query::select()
                    .column(user_role::Column::UserId)
                    .from(user_role::Entity)
                    .and_where(user_role::Column::RoleKey.eq("teacher"))
                    .to_owned(),
            ),
        );

    if let Some(ref department) = query.department {
        select = select.filter(user::Column::Department.eq(department.clone()));
    }
    if let Some(ref title) = query.title {
        select = select.filter(user::Column::Title.eq(title.clone()));
    }
    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let teachers = select
        .order_by_asc(user::Column::Username)
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::Username)
        .column(user::Column::Department)
        .column(user::Column::Title)
        .into_model::<TeacherListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(teachers))
}

#[utoipa::path(
    post,
    path = "/bindings",
    tag = "Advisors",
    operation_id = "bindStudent",
    summary = "Bind a student to a teacher",
    description = "Admins may bind any pair; teachers may only bind students to themselves.",
    request_body = BindStudentRequest,
    responses(
        (status = 201, description = "Binding created", body = AdvisorBindingResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student or teacher not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already bound (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn bind_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BindStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_any_role(&["admin", "teacher"])?;
    if !auth_user.has_role("admin") && payload.teacher_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    create_binding(&state.db, payload.student_id, payload.teacher_id).await
}

#[utoipa::path(
    post,
    path = "/choose",
    tag = "Advisors",
    operation_id = "chooseAdvisor",
    summary = "Choose an advisor (student self-service)",
    request_body = ChooseAdvisorRequest,
    responses(
        (status = 201, description = "Binding created", body = AdvisorBindingResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Teacher not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already bound (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn choose_advisor(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChooseAdvisorRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_role("student")?;
    create_binding(&state.db, auth_user.user_id, payload.teacher_id).await
}

#[utoipa::path(
    delete,
    path = "/bindings/{student_id}/{teacher_id}",
    tag = "Advisors",
    operation_id = "unbindStudent",
    summary = "Remove an advisor binding",
    params(
        ("student_id" = i32, Path, description = "Student user ID"),
        ("teacher_id" = i32, Path, description = "Teacher user ID"),
    ),
    responses(
        (status = 204, description = "Binding removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Binding not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn unbind_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((student_id, teacher_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_any_role(&["admin", "teacher"])?;
    if !auth_user.has_role("admin") && teacher_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }

    let binding = student_teacher::Entity::find_by_id((student_id, teacher_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Advisor binding not found".into()))?;

    let active: student_teacher::ActiveModel = binding.into();
    active.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/students",
    tag = "Advisors",
    operation_id = "listMyStudents",
    summary = "List the authenticated teacher's advisees",
    responses(
        (status = 200, description = "List of advisees", body = Vec<AdviseeListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_my_students(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdviseeListItem>>, AppError> {
    auth_user.require_role("teacher")?;

    let students = student_teacher::Entity::find()
        .filter(student_teacher::Column::TeacherId.eq(auth_user.user_id))
        .join(JoinType::InnerJoin, student_teacher::Relation::Student.def())
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::Username)
        .column(user::Column::Grade)
        .column(user::Column::Major)
        .column(student_teacher::Column::BoundAt)
        .order_by_asc(user::Column::Username)
        .into_model::<AdviseeListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/mine",
    tag = "Advisors",
    operation_id = "listMyAdvisors",
    summary = "List the authenticated student's advisor bindings",
    responses(
        (status = 200, description = "Current bindings", body = Vec<AdvisorBindingResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_my_advisors(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdvisorBindingResponse>>, AppError> {
    let bindings = student_teacher::Entity::find()
        .filter(student_teacher::Column::StudentId.eq(auth_user.user_id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(AdvisorBindingResponse::from)
        .collect();

    Ok(Json(bindings))
}

async fn create_binding(
    db: &DatabaseConnection,
    student_id: i32,
    teacher_id: i32,
) -> Result<(StatusCode, Json<AdvisorBindingResponse>), AppError> {
    let student = super::user::find_user(db, student_id).await?;
    let teacher = super::user::find_user(db, teacher_id).await?;

    if !has_role(db, student.id, "student").await? {
        return Err(AppError::Validation("Target user is not a student".into()));
    }
    if !has_role(db, teacher.id, "teacher").await? {
        return Err(AppError::Validation("Target user is not a teacher".into()));
    }

    let binding = student_teacher::ActiveModel {
        student_id: Set(student_id),
        teacher_id: Set(teacher_id),
        bound_at: Set(chrono::Utc::now()),
    };

    let model = match binding.insert(db).await {
        Ok(model) => model,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict("Already bound to this teacher".into()));
        }
        Err(e) => return Err(e.into()),
    };

    notify::notify(
        db,
        teacher_id,
        "advisor_binding",
        "New advisee",
        &format!("Student {} is now bound to you", student.username),
        "normal",
    )
    .await?;

    Ok((StatusCode::CREATED, Json(AdvisorBindingResponse::from(model))))
}

pub async fn has_role<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    role: &str,
) -> Result<bool, AppError> {
    Ok(user_role::Entity::find_by_id((user_id, role.to_string()))
        .one(db)
        .await?
        .is_some())
}

/// True when `teacher_id` advises `student_id`.
pub async fn advises<C: ConnectionTrait>(
    db: &C,
    teacher_id: i32,
    student_id: i32,
) -> Result<bool, AppError> {
    Ok(
        student_teacher::Entity::find_by_id((student_id, teacher_id))
            .one(db)
            .await?
            .is_some(),
    )
}
