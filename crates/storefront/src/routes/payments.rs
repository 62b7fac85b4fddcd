//! Payment intent handlers.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cemento_core::minor_units;

use super::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Create-intent request. `amount` is in major currency units.
#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyIntentRequest {
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyIntentResponse {
    pub id: String,
    pub status: String,
    /// Minor units.
    pub amount: i64,
    pub currency: String,
}

/// Create a payment intent for the signed-in user.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>> {
    let amount = request
        .amount
        .filter(|amount| *amount >= Decimal::ONE)
        .ok_or_else(|| AppError::BadRequest("Amount must be at least 1".to_string()))?;
    let amount = minor_units(amount).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user_id = user.id.to_string();
    let intent = state
        .payments()
        .create_intent(amount, &[("user_id", user_id.as_str())])
        .await?;

    let client_secret = intent.client_secret.ok_or_else(|| {
        AppError::Internal(format!("payment intent {} has no client secret", intent.id))
    })?;

    tracing::info!(payment_intent_id = %intent.id, amount, "Payment intent created");

    Ok(Json(CreateIntentResponse {
        client_secret,
        payment_intent_id: intent.id,
    }))
}

/// Report the processor's view of a payment intent.
#[instrument(skip_all)]
pub async fn verify_payment_intent(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiJson(request): ApiJson<VerifyIntentRequest>,
) -> Result<Json<VerifyIntentResponse>> {
    let id = request
        .payment_intent_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("paymentIntentId is required".to_string()))?;

    let intent = state.payments().retrieve_intent(id.trim()).await?;

    Ok(Json(VerifyIntentResponse {
        id: intent.id,
        status: intent.status,
        amount: intent.amount,
        currency: intent.currency,
    }))
}
