//! Order lifecycle: checkout, confirmation, listing, staff maintenance.
//!
//! Status and payment-status transitions are not enforced. Staff may set any
//! value; changes to orders already delivered or cancelled are logged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use cemento_core::{
    NotificationType, OrderId, OrderTotals, UserId, check_amount, format_amount, short_reference,
};

use crate::db::{RepositoryError, Store};
use crate::error::AppError;
use crate::models::{
    BulkDeleteOutcome, CurrentUser, NewAddress, NewNotification, NewOrder, NewOrderItem,
    Notification, Order, OrderDetail, OrderFilter, OrderUpdate,
};
use crate::payments::{PaymentClient, PaymentError};

/// Errors from the order coordinator.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Request failed validation.
    #[error("{0}")]
    Invalid(String),

    /// A referenced record does not exist (or is not visible to the caller).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Caller may not act on another user's orders.
    #[error("cannot access another user's orders")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] RepositoryError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Invalid(msg) => Self::BadRequest(msg),
            OrderError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            forbidden @ OrderError::Forbidden => Self::Forbidden(forbidden.to_string()),
            OrderError::Store(e) => Self::Store(e),
            OrderError::Payment(e) => Self::Payment(e),
        }
    }
}

/// Checkout payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub payment_intent_id: String,
    pub shipping_address: NewAddress,
    pub items: Vec<NewOrderItem>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
}

/// Result of confirming an order against its payment intent.
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    /// Processor status of the intent.
    pub payment_status: String,
    pub order: OrderDetail,
    /// Received amount in minor units.
    pub amount_received: i64,
}

/// Coordinates orders across the store and the payment processor.
pub struct OrderService<'a> {
    store: &'a dyn Store,
    payments: &'a PaymentClient,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, payments: &'a PaymentClient) -> Self {
        Self { store, payments }
    }

    /// Place an order for the signed-in user.
    ///
    /// The total is computed here from subtotal, shipping and tax; address,
    /// order and item snapshots are written together.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Invalid` for malformed checkouts or a payment
    /// intent that already has an order.
    #[instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn create(
        &self,
        user: &CurrentUser,
        request: CheckoutRequest,
    ) -> Result<OrderDetail, OrderError> {
        let payment_intent_id = request.payment_intent_id.trim().to_owned();
        if payment_intent_id.is_empty() {
            return Err(OrderError::Invalid("payment_intent_id is required".into()));
        }
        validate_items(&request.items)?;
        validate_address(&request.shipping_address)?;

        let totals = OrderTotals::new(request.subtotal, request.shipping_cost, request.tax);
        totals
            .validate()
            .map_err(|e| OrderError::Invalid(e.to_string()))?;

        let detail = self
            .store
            .create_order(NewOrder {
                user_id: user.id,
                payment_intent_id,
                totals,
                address: request.shipping_address,
                items: request.items,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    OrderError::Invalid("an order already exists for this payment intent".into())
                }
                other => OrderError::Store(other),
            })?;

        tracing::info!(order_id = %detail.order.id, total = %detail.order.total, "Order created");
        Ok(detail)
    }

    /// Look up the order for a payment intent alongside the intent's status.
    ///
    /// Read-only: neither the order nor the intent is modified.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` when the processor has no such intent,
    /// no order references it, or the order belongs to someone else.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn confirm(
        &self,
        user: &CurrentUser,
        payment_intent_id: &str,
    ) -> Result<Confirmation, OrderError> {
        let payment_intent_id = payment_intent_id.trim();
        if payment_intent_id.is_empty() {
            return Err(OrderError::Invalid("payment_intent_id is required".into()));
        }

        let intent = self.payments.retrieve_intent(payment_intent_id).await?;

        let order = self
            .store
            .find_order_by_payment_intent(payment_intent_id)
            .await?
            .filter(|detail| user.can_access(detail.order.user_id))
            .ok_or(OrderError::NotFound("Order"))?;

        Ok(Confirmation {
            payment_status: intent.status,
            order,
            amount_received: intent.amount_received,
        })
    }

    /// Orders of one user, newest first, optionally narrowed to one order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Invalid` for a missing or malformed `user_id` and
    /// `OrderError::Forbidden` when a customer asks for someone else's orders.
    #[instrument(skip(self, user), fields(caller = %user.id))]
    pub async fn list_for_user(
        &self,
        user: &CurrentUser,
        user_id: Option<&str>,
        order_id: Option<&str>,
    ) -> Result<Vec<OrderDetail>, OrderError> {
        let user_id = user_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| OrderError::Invalid("user_id is required".into()))?;
        let user_id = UserId::parse(user_id)
            .map_err(|_| OrderError::Invalid("user_id must be a valid UUID".into()))?;

        if !user.can_access(user_id) {
            return Err(OrderError::Forbidden);
        }

        let order_id = order_id
            .filter(|s| !s.trim().is_empty())
            .map(OrderId::parse)
            .transpose()
            .map_err(|_| OrderError::Invalid("order_id must be a valid UUID".into()))?;

        Ok(self
            .store
            .list_orders(OrderFilter {
                user_id: Some(user_id),
                order_id,
            })
            .await?)
    }

    /// Record the "Order Placed" notification for the caller.
    ///
    /// Failures propagate to this call's caller; checkout clients treat
    /// them as non-fatal.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Invalid` for a malformed order id or negative
    /// total, and `OrderError::Store` if the insert fails.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn notify_order_placed(
        &self,
        user: &CurrentUser,
        order_id: &str,
        order_total: Decimal,
    ) -> Result<Notification, OrderError> {
        let order_id = OrderId::parse(order_id)
            .map_err(|_| OrderError::Invalid("orderId must be a valid UUID".into()))?;
        if order_total.is_sign_negative() {
            return Err(OrderError::Invalid("orderTotal must not be negative".into()));
        }

        let notification = self
            .store
            .create_notification(order_placed_notification(user.id, order_id, order_total))
            .await?;
        Ok(notification)
    }

    /// Every order, newest first (staff).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Store` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<OrderDetail>, OrderError> {
        Ok(self.store.list_orders(OrderFilter::default()).await?)
    }

    /// One order with address, items and additional services (staff).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Invalid` for a non-UUID id and
    /// `OrderError::NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: &str) -> Result<OrderDetail, OrderError> {
        let id = parse_order_id(id)?;
        self.store
            .get_order_detail(id)
            .await?
            .ok_or(OrderError::NotFound("Order"))
    }

    /// Apply a staff status update.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Invalid` for a non-UUID id or an empty update and
    /// `OrderError::NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn update(&self, id: &str, update: OrderUpdate) -> Result<Order, OrderError> {
        let id = parse_order_id(id)?;
        if update.is_empty() {
            return Err(OrderError::Invalid(
                "status or payment_status is required".into(),
            ));
        }

        let current = self
            .store
            .get_order(id)
            .await?
            .ok_or(OrderError::NotFound("Order"))?;

        if current.status.is_terminal() && update.status.is_some_and(|s| s != current.status) {
            tracing::warn!(
                order_id = %id,
                from = %current.status,
                to = ?update.status,
                "Changing status of a closed order"
            );
        }

        self.store
            .update_order(id, update)
            .await?
            .ok_or(OrderError::NotFound("Order"))
    }

    /// Delete orders and any address left unreferenced (staff).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Invalid` unless `ids` is a non-empty list of UUIDs.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[String]) -> Result<BulkDeleteOutcome, OrderError> {
        if ids.is_empty() {
            return Err(OrderError::Invalid(
                "ids must be a non-empty array of order ids".into(),
            ));
        }
        let ids = ids
            .iter()
            .map(|id| OrderId::parse(id))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| OrderError::Invalid("every id must be a valid UUID".into()))?;

        let outcome = self.store.bulk_delete_orders(&ids).await?;
        tracing::info!(
            deleted = outcome.deleted_ids.len(),
            addresses_removed = outcome.removed_addresses.len(),
            "Orders deleted"
        );
        Ok(outcome)
    }
}

/// The notification recorded when an order is placed.
#[must_use]
pub fn order_placed_notification(
    user_id: UserId,
    order_id: OrderId,
    total: Decimal,
) -> NewNotification {
    NewNotification {
        user_id,
        title: "Order Placed".to_owned(),
        message: format!(
            "Your order #{} has been placed successfully. Total: {}",
            short_reference(&order_id.to_string()),
            format_amount(total)
        ),
        kind: NotificationType::Order,
        order_id: Some(order_id),
    }
}

fn parse_order_id(id: &str) -> Result<OrderId, OrderError> {
    OrderId::parse(id).map_err(|_| OrderError::Invalid("Invalid order id".into()))
}

fn validate_items(items: &[NewOrderItem]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::Invalid("at least one item is required".into()));
    }
    for item in items {
        if item.product_name.trim().is_empty() {
            return Err(OrderError::Invalid("item product_name is required".into()));
        }
        if item.quantity < 1 {
            return Err(OrderError::Invalid(format!(
                "quantity for {} must be at least 1",
                item.product_name
            )));
        }
        check_amount("price", item.price).map_err(|e| {
            OrderError::Invalid(format!("{} ({e})", item.product_name))
        })?;
    }
    Ok(())
}

fn validate_address(address: &NewAddress) -> Result<(), OrderError> {
    let required = [
        ("full_name", &address.full_name),
        ("line1", &address.line1),
        ("city", &address.city),
        ("state", &address.state),
        ("postal_code", &address.postal_code),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(OrderError::Invalid(format!(
                "shipping_address.{field} is required"
            )));
        }
    }
    Ok(())
}
