//! Staff enquiry inbox.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use cemento_core::{EnquiryId, EnquiryStatus};

use super::super::{ApiJson, ApiQuery};
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::services::EnquiryService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<EnquiryStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub reply: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Value>> {
    let enquiries = EnquiryService::new(state.store()).list(query.status).await?;
    Ok(Json(json!({ "enquiries": enquiries })))
}

/// Save a reply, close the enquiry and notify the customer.
#[instrument(skip_all, fields(staff_id = %staff.id, enquiry_id = %id))]
pub async fn reply(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ReplyRequest>,
) -> Result<Json<Value>> {
    let id = EnquiryId::parse(&id)
        .map_err(|_| AppError::BadRequest("Invalid enquiry id".to_string()))?;
    let reply = request
        .reply
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Reply must not be empty".to_string()))?;

    let outcome = EnquiryService::new(state.store())
        .reply(id, reply.trim())
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Enquiry not found".to_string()),
            other => other.into(),
        })?;

    Ok(Json(json!({
        "enquiry": outcome.enquiry,
        "notified": outcome.notified,
    })))
}
