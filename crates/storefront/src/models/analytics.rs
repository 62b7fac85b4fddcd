//! Catalog rows and the raw rows the KPI engine reduces.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cemento_core::{PaymentStatus, ProductId, ProductStatus, UserId};

/// A catalog product (read-only for this service apart from seeding).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub status: ProductStatus,
    pub is_active: bool,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Parameters for inserting a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub status: ProductStatus,
    pub is_active: bool,
    pub stock_quantity: i32,
    /// Backdated creation time; `None` means now.
    pub created_at: Option<DateTime<Utc>>,
}

/// A paid order's total with its creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct DatedAmount {
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One sold line: product name and quantity.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SoldItem {
    pub product_name: String,
    pub quantity: i32,
}

/// Minimal order facts for the daily summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderActivity {
    pub user_id: UserId,
    pub total: Decimal,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// A published, active product running low.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct LowStockProduct {
    pub name: String,
    pub stock_quantity: i32,
}
