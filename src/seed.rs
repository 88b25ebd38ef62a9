use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{notification, project_type, role, system_log, system_setting};

/// Roles seeded on startup: (key, display name, description).
const DEFAULT_ROLES: &[(&str, &str, &str)] = &[
    ("admin", "Administrator", "Full access to users, projects, competitions, and system administration"),
    ("teacher", "Teacher", "Advises students, reviews projects and files, judges competitions"),
    ("student", "Student", "Owns projects, registers for competitions, submits entries"),
];

/// Settings seeded on startup: (key, value, description).
const DEFAULT_SETTINGS: &[(&str, &str, &str)] = &[
    ("maintenance_mode", "false", "When true, the frontend shows a maintenance banner"),
];

/// Project type catalog entries seeded on startup: (key, name, sort order).
const DEFAULT_PROJECT_TYPES: &[(&str, &str, i32)] = &[
    ("innovation", "Innovation project", 10),
    ("graduation", "Graduation design", 20),
    ("lab", "Lab research", 30),
    ("other", "Other", 90),
];

/// Seed the `role` and `system_setting` tables with defaults.
pub async fn seed_defaults(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &(key, display_name, description) in DEFAULT_ROLES {
        let model = role::ActiveModel {
            key: Set(key.to_string()),
            display_name: Set(display_name.to_string()),
            description: Set(Some(description.to_string())),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                OnConflict::column(role::Column::Key)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut settings_inserted = 0u32;
    for &(key, value, description) in DEFAULT_SETTINGS {
        let model = system_setting::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            description: Set(Some(description.to_string())),
            updated_by: Set(None),
            updated_at: Set(chrono::Utc::now()),
        };

        let result = system_setting::Entity::insert(model)
            .on_conflict(
                OnConflict::column(system_setting::Column::Key)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => settings_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if settings_inserted > 0 {
        info!("Seeded {} new system settings", settings_inserted);
    }

    let mut types_inserted = 0u32;
    for &(key, name, sort_order) in DEFAULT_PROJECT_TYPES {
        let now = chrono::Utc::now();
        let model = project_type::ActiveModel {
            key: Set(key.to_string()),
            name: Set(name.to_string()),
            description: Set(None),
            parent_id: Set(None),
            sort_order: Set(sort_order),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = project_type::Entity::insert(model)
            .on_conflict(
                OnConflict::column(project_type::Column::Key)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => types_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if types_inserted > 0 {
        info!("Seeded {} new project types", types_inserted);
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Unread badge: SELECT COUNT(*) FROM notification WHERE user_id = ? AND is_read = false
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_notification_user_read")
        .table(notification::Entity)
        .col(notification::Column::UserId)
        .col(notification::Column::IsRead)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_notification_user_read exists"),
        Err(e) => tracing::warn!("Failed to create index idx_notification_user_read: {}", e),
    }

    // Log browsing filters by level over a time range
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_system_log_level_created")
        .table(system_log::Entity)
        .col(system_log::Column::Level)
        .col(system_log::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_system_log_level_created exists"),
        Err(e) => tracing::warn!("Failed to create index idx_system_log_level_created: {}", e),
    }

    Ok(())
}
