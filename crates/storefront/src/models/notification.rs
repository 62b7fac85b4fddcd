//! Per-user notification records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cemento_core::{NotificationId, NotificationType, OrderId, UserId};

/// A notification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationType,
    pub read: bool,
    pub order_id: Option<OrderId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a notification. New notifications are unread.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub order_id: Option<OrderId>,
}
