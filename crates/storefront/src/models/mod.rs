//! Domain models for the storefront.
//!
//! Row types derive `sqlx::FromRow` and `Serialize` so they flow straight from
//! the store to JSON responses. Input types (`New*`) derive `Deserialize` for
//! request bodies.

pub mod analytics;
pub mod enquiry;
pub mod notification;
pub mod order;
pub mod session;
pub mod user;

pub use analytics::{DatedAmount, LowStockProduct, NewProduct, OrderActivity, Product, SoldItem};
pub use enquiry::{Enquiry, NewEnquiry};
pub use notification::{NewNotification, Notification};
pub use order::{
    AdditionalService, Address, BulkDeleteOutcome, NewAddress, NewOrder, NewOrderItem, Order,
    OrderDetail, OrderFilter, OrderItem, OrderUpdate,
};
pub use session::{CurrentUser, session_keys};
pub use user::Profile;
