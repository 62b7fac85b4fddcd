//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur while signing a user in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The access token was rejected by the auth service.
    #[error("invalid or expired access token")]
    InvalidToken,

    /// The auth service returned a user without a usable email.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] cemento_core::EmailError),

    /// HTTP request to the auth service failed.
    #[error("auth service HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Auth service returned an unexpected error response.
    #[error("auth service error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the request or parse the response.
    #[error("auth service parse error: {0}")]
    Parse(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Whether the failure is the caller's fault (bad token) rather than ours.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidToken | Self::InvalidEmail(_))
    }
}
