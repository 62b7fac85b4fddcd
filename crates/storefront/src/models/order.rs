//! Order, item snapshot, and address types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cemento_core::{
    AdditionalServiceId, AddressId, OrderId, OrderItemId, OrderStatus, OrderTotals, PaymentStatus,
    ProductId, UserId,
};

/// An order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// External payment-intent identifier, set at checkout.
    pub payment_intent_id: Option<String>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub address_id: Option<AddressId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of a purchased line, frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub variant_type: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Extra service billed on an order (unloading, site delivery, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AdditionalService {
    pub id: AdditionalServiceId,
    pub order_id: OrderId,
    pub name: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A user's shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub full_name: String,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

/// An order joined with its address and item snapshots.
///
/// `additional_services` is only loaded for the staff detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub address: Option<Address>,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_services: Option<Vec<AdditionalService>>,
}

/// Which orders to list.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    /// Restrict to one owner. `None` lists every order (staff).
    pub user_id: Option<UserId>,
    /// Narrow to a single order.
    pub order_id: Option<OrderId>,
}

/// Shipping address submitted at checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub full_name: String,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// ISO country code; defaults to `IN`.
    pub country: Option<String>,
}

/// Cart line submitted at checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub variant_type: Option<String>,
    pub image_url: Option<String>,
}

/// Everything needed to insert an order atomically.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub payment_intent_id: String,
    pub totals: OrderTotals,
    pub address: NewAddress,
    pub items: Vec<NewOrderItem>,
}

/// Staff update to an order. Any combination of values is accepted.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderUpdate {
    /// True when neither field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none()
    }
}

/// Result of a staff bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    /// Orders that existed and were removed.
    pub deleted_ids: Vec<OrderId>,
    /// Addresses removed because no surviving order referenced them.
    pub removed_addresses: Vec<AddressId>,
}
