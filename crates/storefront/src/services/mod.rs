//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Sign-in against the hosted auth service
//! - `orders` - Order lifecycle coordinator (checkout, confirm, staff maintenance)
//! - `notifications` - Per-user notification records
//! - `kpi` - KPI snapshot and daily summary
//! - `enquiries` - Staff replies to customer enquiries
//!
//! Services borrow the store (and clients) from `AppState` for the duration
//! of a request.

pub mod auth;
pub mod enquiries;
pub mod kpi;
pub mod notifications;
pub mod orders;

pub use enquiries::EnquiryService;
pub use kpi::KpiEngine;
pub use notifications::NotificationService;
pub use orders::OrderService;
