//! Status enums for various entities.
//!
//! Each enum maps to a `PostgreSQL` enum type in the `shop` schema (with the
//! `postgres` feature) and serializes as its lowercase name in JSON.

use serde::{Deserialize, Serialize};

/// Implements `as_str`, `Display`, and `FromStr` from a variant/name table.
macro_rules! string_enum {
    ($name:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire/database name of this value.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", $what, ": {}"), s)),
                }
            }
        }
    };
}

/// Order lifecycle status.
///
/// The intended flow is `pending → processing → shipped → delivered`, with
/// `cancelled` reachable from any non-terminal state. Transitions are not
/// enforced; staff may set any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

string_enum!(OrderStatus, "order status", {
    Pending => "pending",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Delivered and cancelled orders no longer move.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// Payment status of an order.
///
/// `pending → paid | failed`, `paid → refunded`. Only `paid` orders count
/// towards revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.payment_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

string_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Paid => "paid",
    Failed => "failed",
    Refunded => "refunded",
});

/// Category of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.notification_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Order,
    Promotion,
    System,
    Payment,
    Shipping,
}

string_enum!(NotificationType, "notification type", {
    Order => "order",
    Promotion => "promotion",
    System => "system",
    Payment => "payment",
    Shipping => "shipping",
});

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.user_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Shopper; sees only their own orders and notifications.
    #[default]
    Customer,
    /// Store staff; may use the `/api/admin` surface.
    Staff,
}

string_enum!(UserRole, "user role", {
    Customer => "customer",
    Staff => "staff",
});

/// Status of a customer enquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.enquiry_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum EnquiryStatus {
    #[default]
    Open,
    Replied,
    Closed,
}

string_enum!(EnquiryStatus, "enquiry status", {
    Open => "open",
    Replied => "replied",
    Closed => "closed",
});

/// Catalog visibility of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.product_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

string_enum!(ProductStatus, "product status", {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});
