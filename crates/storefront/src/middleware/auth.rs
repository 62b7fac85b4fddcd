//! Identity middleware and authentication extractors.
//!
//! [`resolve_identity`] reads the signed-in user from the session once per
//! request and stores it in the request extensions. The extractors only look
//! at the extensions, so handlers never touch the session directly.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};

/// Copy the session user (if any) into request extensions.
///
/// An identity already present in the extensions is left as is.
pub async fn resolve_identity(mut request: Request, next: Next) -> Response {
    if request.extensions().get::<CurrentUser>().is_none() {
        let user = match request.extensions().get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to read session user");
                    None
                }),
            None => None,
        };
        if let Some(user) = user {
            request.extensions_mut().insert(user);
        }
    }

    if let Some(user) = request.extensions().get::<CurrentUser>() {
        Span::current().record("user_id", tracing::field::display(user.id));
        set_sentry_user(&user.id, None);
    }

    next.run(request).await
}

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a signed-in staff user.
pub struct RequireStaff(pub CurrentUser);

/// Rejection for the authentication extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No signed-in user.
    Unauthorized,
    /// Signed in, but not staff.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => {
                AppError::Unauthorized("Authentication required".to_string()).into_response()
            }
            Self::Forbidden => {
                AppError::Forbidden("Staff access required".to_string()).into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthRejection::Unauthorized)?;
        if !user.is_staff() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Helper to set the current user in the session.
///
/// The session id is cycled to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
