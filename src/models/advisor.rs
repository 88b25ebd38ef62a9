use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct TeacherListQuery {
    pub department: Option<String>,
    pub title: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct TeacherListItem {
    pub id: i32,
    pub username: String,
    pub department: Option<String>,
    pub title: Option<String>,
}

/// Admin/teacher request binding a specific student to a teacher.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct BindStudentRequest {
    pub student_id: i32,
    pub teacher_id: i32,
}

/// Student request choosing their own advisor.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChooseAdvisorRequest {
    pub teacher_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdvisorBindingResponse {
    pub student_id: i32,
    pub teacher_id: i32,
    pub bound_at: DateTime<Utc>,
}

impl From<crate::entity::student_teacher::Model> for AdvisorBindingResponse {
    fn from(m: crate::entity::student_teacher::Model) -> Self {
        Self {
            student_id: m.student_id,
            teacher_id: m.teacher_id,
            bound_at: m.bound_at,
        }
    }
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct AdviseeListItem {
    pub id: i32,
    pub username: String,
    pub grade: Option<String>,
    pub major: Option<String>,
    pub bound_at: DateTime<Utc>,
}
