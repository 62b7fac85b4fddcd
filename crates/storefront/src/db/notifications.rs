//! Notification repository.
//!
//! Every operation is scoped to the owning user.

use chrono::Utc;

use cemento_core::{NotificationId, UserId};

use super::{PgStore, RepositoryError};
use crate::models::{NewNotification, Notification};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, type, read, order_id, created_at, updated_at";

/// Notification persistence operations.
#[async_trait::async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert an unread notification.
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, RepositoryError>;

    /// All notifications for a user, newest first.
    async fn list_notifications(&self, user_id: UserId)
    -> Result<Vec<Notification>, RepositoryError>;

    /// Mark one notification read. Returns `false` if the user has no such notification.
    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<bool, RepositoryError>;

    /// Mark every unread notification read. Returns the number updated.
    async fn mark_all_notifications_read(&self, user_id: UserId) -> Result<u64, RepositoryError>;

    /// Hard-delete one notification. Returns `false` if the user has no such notification.
    async fn delete_notification(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<bool, RepositoryError>;

    /// Hard-delete all of a user's notifications. Returns the number removed.
    async fn clear_notifications(&self, user_id: UserId) -> Result<u64, RepositoryError>;

    /// Count of unread notifications.
    async fn unread_notification_count(&self, user_id: UserId) -> Result<i64, RepositoryError>;
}

#[async_trait::async_trait]
impl NotificationRepository for PgStore {
    async fn create_notification(
        &self,
        new: NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO shop.notifications (user_id, title, message, type, order_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.message)
        .bind(new.kind)
        .bind(new.order_id)
        .fetch_one(self.pool())
        .await?;
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM shop.notifications \
             WHERE user_id = $1 ORDER BY created_at DESC, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.notifications SET read = TRUE, updated_at = $3 \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.notifications SET read = TRUE, updated_at = $2 \
             WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_notifications(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn unread_notification_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shop.notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }
}
