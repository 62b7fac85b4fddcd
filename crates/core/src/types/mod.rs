//! Core types for Cemento.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{
    MAX_AMOUNT, MoneyError, OrderTotals, check_amount, format_amount, minor_units,
};
pub use status::*;
