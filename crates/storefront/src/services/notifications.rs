//! Notification service.
//!
//! Every query is scoped to the owning user; an id that belongs to someone
//! else behaves exactly like one that does not exist.

use tracing::{error, instrument};

use cemento_core::{NotificationId, UserId};

use crate::db::{RepositoryError, Store};
use crate::models::{NewNotification, Notification};

/// Per-user notification operations.
pub struct NotificationService<'a> {
    store: &'a dyn Store,
}

impl<'a> NotificationService<'a> {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Record a notification, logging instead of failing.
    ///
    /// Returns `true` if it was stored. For post-commit hooks whose caller
    /// must not fail because of a notification.
    #[instrument(skip(self, notification), fields(user_id = %notification.user_id, kind = %notification.kind))]
    pub async fn create(&self, notification: NewNotification) -> bool {
        match self.store.create_notification(notification).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Failed to create notification");
                false
            }
        }
    }

    /// The user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Notification>, RepositoryError> {
        self.store.list_notifications(user_id).await
    }

    /// Number of unread notifications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn unread_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        self.store.unread_notification_count(user_id).await
    }

    /// Mark one of the user's notifications read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such notification.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<(), RepositoryError> {
        if self.store.mark_notification_read(user_id, id).await? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    /// Mark every unread notification read. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the update fails.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        self.store.mark_all_notifications_read(user_id).await
    }

    /// Delete one of the user's notifications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such notification.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: UserId, id: NotificationId) -> Result<(), RepositoryError> {
        if self.store.delete_notification(user_id, id).await? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    /// Delete all of the user's notifications. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        self.store.clear_notifications(user_id).await
    }
}
