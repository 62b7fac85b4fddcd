//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use cemento_core::{Email, UserId, UserRole};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user. The
/// identity middleware copies it into request extensions for the extractors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Hosted-auth user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Local role from the profile table.
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this user may use the staff API.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self.role, UserRole::Staff)
    }

    /// Staff may act on any user's records; customers only on their own.
    #[must_use]
    pub fn can_access(&self, owner: UserId) -> bool {
        self.is_staff() || self.id == owner
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
