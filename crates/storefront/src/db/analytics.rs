//! Raw reads feeding the KPI engine.
//!
//! These return full row sets; the engine partitions and reduces them in
//! process. Fine at current volumes, but every call scans `orders`.

use chrono::{DateTime, Utc};

use super::{PgStore, RepositoryError};
use crate::models::{DatedAmount, OrderActivity, SoldItem};

/// Analytics read operations.
#[async_trait::async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Totals and creation times of every paid order.
    async fn paid_order_amounts(&self) -> Result<Vec<DatedAmount>, RepositoryError>;

    /// Creation time of every order.
    async fn order_timestamps(&self) -> Result<Vec<DateTime<Utc>>, RepositoryError>;

    /// Item lines of orders created in `[start, end)`.
    async fn sold_items_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SoldItem>, RepositoryError>;

    /// Orders created in `[start, end)`.
    async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderActivity>, RepositoryError>;
}

#[async_trait::async_trait]
impl AnalyticsRepository for PgStore {
    async fn paid_order_amounts(&self) -> Result<Vec<DatedAmount>, RepositoryError> {
        let rows = sqlx::query_as::<_, DatedAmount>(
            "SELECT total AS amount, created_at FROM shop.orders WHERE payment_status = 'paid'",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn order_timestamps(&self) -> Result<Vec<DateTime<Utc>>, RepositoryError> {
        let rows = sqlx::query_scalar("SELECT created_at FROM shop.orders")
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }

    async fn sold_items_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SoldItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, SoldItem>(
            "SELECT i.product_name, i.quantity \
             FROM shop.order_items i \
             JOIN shop.orders o ON o.id = i.order_id \
             WHERE o.created_at >= $1 AND o.created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderActivity>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderActivity>(
            "SELECT user_id, total, payment_status, created_at FROM shop.orders \
             WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
