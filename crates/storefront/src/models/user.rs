//! User profile types.
//!
//! Accounts live in the hosted auth service; the store keeps only a profile
//! row mapping the auth user id to a local role.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cemento_core::{Email, UserId, UserRole};

/// Local profile for a hosted-auth user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: UserId,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
