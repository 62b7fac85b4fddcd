//! Product catalog reads (and inserts for seeding).

use chrono::{DateTime, Utc};

use super::{PgStore, RepositoryError};
use crate::models::{LowStockProduct, NewProduct, Product};

/// Catalog operations.
#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a product.
    async fn create_product(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// Creation time of every published product.
    async fn published_product_timestamps(&self) -> Result<Vec<DateTime<Utc>>, RepositoryError>;

    /// Published, active products with stock below `threshold`, lowest stock first.
    async fn low_stock_products(
        &self,
        threshold: i32,
        limit: i64,
    ) -> Result<Vec<LowStockProduct>, RepositoryError>;
}

#[async_trait::async_trait]
impl CatalogRepository for PgStore {
    async fn create_product(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO shop.products (name, status, is_active, stock_quantity, created_at) \
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW())) \
             RETURNING id, name, status, is_active, stock_quantity, created_at",
        )
        .bind(&new.name)
        .bind(new.status)
        .bind(new.is_active)
        .bind(new.stock_quantity)
        .bind(new.created_at)
        .fetch_one(self.pool())
        .await?;
        Ok(product)
    }

    async fn published_product_timestamps(&self) -> Result<Vec<DateTime<Utc>>, RepositoryError> {
        let rows = sqlx::query_scalar("SELECT created_at FROM shop.products WHERE status = 'published'")
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }

    async fn low_stock_products(
        &self,
        threshold: i32,
        limit: i64,
    ) -> Result<Vec<LowStockProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, LowStockProduct>(
            "SELECT name, stock_quantity FROM shop.products \
             WHERE stock_quantity < $1 AND status = 'published' AND is_active \
             ORDER BY stock_quantity ASC, name \
             LIMIT $2",
        )
        .bind(threshold)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
