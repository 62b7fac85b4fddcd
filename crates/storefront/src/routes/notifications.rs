//! Notification handlers. Everything acts on the session user.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use cemento_core::NotificationId;

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::NotificationService;
use crate::state::AppState;

fn parse_id(id: &str) -> Result<NotificationId> {
    NotificationId::parse(id)
        .map_err(|_| AppError::BadRequest("Invalid notification id".to_string()))
}

fn not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Notification not found".to_string()),
        other => other.into(),
    }
}

/// The user's notifications, newest first.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    let notifications = NotificationService::new(state.store()).list(user.id).await?;
    Ok(Json(json!({ "notifications": notifications })))
}

/// Number of unread notifications.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn unread_count(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    let count = NotificationService::new(state.store())
        .unread_count(user.id)
        .await?;
    Ok(Json(json!({ "count": count })))
}

/// Mark one notification read.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    NotificationService::new(state.store())
        .mark_read(user.id, parse_id(&id)?)
        .await
        .map_err(not_found)?;
    Ok(Json(json!({ "success": true })))
}

/// Mark every unread notification read.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    let updated = NotificationService::new(state.store())
        .mark_all_read(user.id)
        .await?;
    Ok(Json(json!({ "success": true, "updated": updated })))
}

/// Delete one notification.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    NotificationService::new(state.store())
        .delete(user.id, parse_id(&id)?)
        .await
        .map_err(not_found)?;
    Ok(Json(json!({ "success": true })))
}

/// Delete all of the user's notifications.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Value>> {
    let deleted = NotificationService::new(state.store()).clear(user.id).await?;
    Ok(Json(json!({ "success": true, "deleted": deleted })))
}
