use sea_orm::{ConnectionTrait, EntityTrait, Set};

use crate::entity::notification;
use crate::error::AppError;

/// Insert an in-app notification for a user.
pub async fn notify<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    kind: &str,
    title: &str,
    content: &str,
    priority: &str,
) -> Result<(), AppError> {
    let model = notification::ActiveModel {
        user_id: Set(user_id),
        kind: Set(kind.to_string()),
        title: Set(title.to_string()),
        content: Set(content.to_string()),
        priority: Set(priority.to_string()),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    notification::Entity::insert(model)
        .exec_without_returning(db)
        .await?;
    Ok(())
}
