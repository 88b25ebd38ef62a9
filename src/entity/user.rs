use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    #[sea_orm(unique)]
    pub email: String,

    /// `active` or `inactive`. Inactive accounts cannot log in.
    pub status: String,

    pub department: Option<String>,
    /// Academic title for teachers (e.g. professor, lecturer).
    pub title: Option<String>,
    /// Enrollment year/grade for students.
    pub grade: Option<String>,
    pub major: Option<String>,

    #[sea_orm(has_one)]
    pub profile: HasOne<super::user_profile::Entity>,

    #[sea_orm(has_many, via = "user_role")]
    pub roles: HasMany<super::role::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
