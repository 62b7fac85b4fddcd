//! Session route handlers.
//!
//! The hosted auth service owns accounts and passwords. These endpoints turn
//! its access token into a server-side session and back.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use super::ApiJson;
use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Token exchange request.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub access_token: String,
}

/// Exchange a hosted-auth access token for a session.
#[instrument(skip_all)]
pub async fn create_session(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<SessionRequest>,
) -> Result<Json<Value>> {
    let user = AuthService::new(state.auth(), state.store())
        .sign_in(&request.access_token)
        .await?;

    set_current_user(&session, &user)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store session: {e}")))?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "Signed in", Some(&[("role", user.role.as_str())]));

    Ok(Json(json!({ "user": user })))
}

/// Clear the session.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;
    clear_sentry_user();
    Ok(Json(json!({ "success": true })))
}

/// The signed-in user.
pub async fn me(RequireAuth(user): RequireAuth) -> Json<Value> {
    Json(json!({ "user": user }))
}
