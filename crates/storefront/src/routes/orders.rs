//! Order handlers: checkout, confirmation, listing, bulk delete.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use super::{ApiJson, ApiQuery};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAuth, RequireStaff};
use crate::services::OrderService;
use crate::services::orders::{CheckoutRequest, Confirmation};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub order_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotificationRequest {
    pub order_id: Option<String>,
    pub order_total: Option<Decimal>,
}

fn service(state: &AppState) -> OrderService<'_> {
    OrderService::new(state.store(), state.payments())
}

/// Place an order.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let order = service(&state).create(&user, request).await?;
    let order_id = order.order.id.to_string();
    add_breadcrumb("checkout", "Order created", Some(&[("order_id", order_id.as_str())]));
    Ok((StatusCode::CREATED, Json(json!({ "order": order }))))
}

/// Fetch the order behind a payment intent with the intent's status.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn confirm(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<ConfirmRequest>,
) -> Result<Json<Confirmation>> {
    let payment_intent_id = request
        .payment_intent_id
        .ok_or_else(|| AppError::BadRequest("payment_intent_id is required".to_string()))?;
    let confirmation = service(&state).confirm(&user, &payment_intent_id).await?;
    Ok(Json(confirmation))
}

/// A user's orders, newest first.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Value>> {
    let orders = service(&state)
        .list_for_user(&user, query.user_id.as_deref(), query.order_id.as_deref())
        .await?;
    Ok(Json(json!({ "orders": orders })))
}

/// Delete orders and orphaned addresses (staff).
#[instrument(skip_all, fields(staff_id = %staff.id))]
pub async fn bulk_delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ApiJson(request): ApiJson<BulkDeleteRequest>,
) -> Result<Json<Value>> {
    let ids = request.ids.unwrap_or_default();
    let outcome = service(&state).bulk_delete(&ids).await?;
    Ok(Json(json!({
        "message": format!("Deleted {} order(s)", outcome.deleted_ids.len()),
        "deletedIds": outcome.deleted_ids,
    })))
}

/// Record the "Order Placed" notification for the signed-in user.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_notification(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<OrderNotificationRequest>,
) -> Result<Json<Value>> {
    let (Some(order_id), Some(order_total)) = (request.order_id, request.order_total) else {
        return Err(AppError::BadRequest(
            "orderId and orderTotal are required".to_string(),
        ));
    };
    service(&state)
        .notify_order_placed(&user, &order_id, order_total)
        .await?;
    Ok(Json(json!({ "success": true })))
}
