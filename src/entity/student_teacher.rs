use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Advisor binding between a student and a teacher.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_teacher")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub teacher_id: i32,
    #[sea_orm(belongs_to, relation_enum = "Student", from = "student_id", to = "id")]
    pub student: BelongsTo<super::user::Entity>,
    #[sea_orm(belongs_to, relation_enum = "Teacher", from = "teacher_id", to = "id")]
    pub teacher: BelongsTo<super::user::Entity>,

    pub bound_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
