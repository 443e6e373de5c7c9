use sqlx::PgConnection;
use uuid::Uuid;

use super::FreelanceService;
use crate::database::models::freelance::{Notification, NotificationKind};
use crate::services::{ServiceError, ServiceResult};

/// Queue a notification inside the caller's transaction.
pub(super) async fn notify(
    conn: &mut PgConnection,
    user_id: Uuid,
    kind: NotificationKind,
    content: impl Into<String>,
) -> ServiceResult<()> {
    sqlx::query("INSERT INTO freelance.notifications (user_id, kind, content) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(kind)
        .bind(content.into())
        .execute(conn)
        .await?;
    Ok(())
}

impl FreelanceService {
    pub async fn notifications(&self, user_id: Uuid) -> ServiceResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM freelance.notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    pub async fn mark_notification_read(&self, user_id: Uuid, notification_id: Uuid) -> ServiceResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE freelance.notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Notification"))
    }
}
