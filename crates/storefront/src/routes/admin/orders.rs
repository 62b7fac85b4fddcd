//! Staff order management.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use super::super::ApiJson;
use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::models::OrderUpdate;
use crate::services::OrderService;
use crate::state::AppState;

/// Every order with its address, newest first.
pub async fn select(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<Value>> {
    let orders = OrderService::new(state.store(), state.payments())
        .list_all()
        .await?;
    Ok(Json(json!({ "orders": orders })))
}

pub async fn show(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let order = OrderService::new(state.store(), state.payments())
        .detail(&id)
        .await?;
    Ok(Json(json!({ "order": order })))
}

/// Change an order's fulfilment and/or payment status.
#[instrument(skip_all, fields(staff_id = %staff.id, order_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<OrderUpdate>,
) -> Result<Json<Value>> {
    let order = OrderService::new(state.store(), state.payments())
        .update(&id, update)
        .await?;
    tracing::info!(status = %order.status, payment_status = %order.payment_status, "Order updated");
    Ok(Json(json!({ "order": order })))
}
