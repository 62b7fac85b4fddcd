//! Cemento storefront library.
//!
//! The HTTP API behind the cement storefront: checkout and payment intents,
//! orders, in-app notifications, staff order management, KPI analytics and
//! enquiry replies. Exposed as a library so the binary, the CLI and the
//! integration tests share one router and one store abstraction.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod routes;
pub mod services;
pub mod state;
