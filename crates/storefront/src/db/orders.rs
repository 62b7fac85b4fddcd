//! Order repository: orders, item snapshots, extra services and addresses.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use cemento_core::{AddressId, OrderId};

use super::{PgStore, RepositoryError};
use crate::models::{
    AdditionalService, Address, BulkDeleteOutcome, NewOrder, Order, OrderDetail, OrderFilter,
    OrderItem, OrderUpdate,
};

const ORDER_COLUMNS: &str = "id, user_id, status, payment_status, payment_intent_id, \
     subtotal, shipping_cost, tax, total, address_id, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, price, quantity, \
     variant_type, image_url, created_at";

const ADDRESS_COLUMNS: &str = "id, user_id, full_name, phone, line1, line2, city, state, \
     postal_code, country, created_at";

/// Order persistence operations.
#[async_trait::async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert address, order and item snapshots as one unit.
    async fn create_order(&self, order: NewOrder) -> Result<OrderDetail, RepositoryError>;

    /// Fetch a bare order row.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Orders matching the filter, newest first, with address and items.
    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderDetail>, RepositoryError>;

    /// One order with address, items and additional services.
    async fn get_order_detail(&self, id: OrderId)
    -> Result<Option<OrderDetail>, RepositoryError>;

    /// The order linked to a payment intent, with address and items.
    async fn find_order_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<OrderDetail>, RepositoryError>;

    /// Apply a staff update and refresh `updated_at`.
    async fn update_order(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, RepositoryError>;

    /// Delete orders and their children, then drop addresses nothing references.
    ///
    /// Order of operations: items and extra services, capture address refs,
    /// orders, then orphaned addresses.
    async fn bulk_delete_orders(
        &self,
        ids: &[OrderId],
    ) -> Result<BulkDeleteOutcome, RepositoryError>;
}

#[async_trait::async_trait]
impl OrderRepository for PgStore {
    async fn create_order(&self, new: NewOrder) -> Result<OrderDetail, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        let address = sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO shop.addresses \
                 (user_id, full_name, phone, line1, line2, city, state, postal_code, country) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(&new.address.full_name)
        .bind(&new.address.phone)
        .bind(&new.address.line1)
        .bind(&new.address.line2)
        .bind(&new.address.city)
        .bind(&new.address.state)
        .bind(&new.address.postal_code)
        .bind(new.address.country.as_deref().unwrap_or("IN"))
        .fetch_one(&mut *tx)
        .await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO shop.orders \
                 (user_id, payment_intent_id, subtotal, shipping_cost, tax, total, address_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(&new.payment_intent_id)
        .bind(new.totals.subtotal)
        .bind(new.totals.shipping_cost)
        .bind(new.totals.tax)
        .bind(new.totals.total()?)
        .bind(address.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "order for this payment intent"))?;

        let mut items = Vec::with_capacity(new.items.len());
        for item in &new.items {
            let row = sqlx::query_as::<_, OrderItem>(&format!(
                "INSERT INTO shop.order_items \
                     (order_id, product_id, product_name, price, quantity, variant_type, image_url) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING {ITEM_COLUMNS}"
            ))
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.price)
            .bind(item.quantity)
            .bind(&item.variant_type)
            .bind(&item.image_url)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;

        Ok(OrderDetail {
            order,
            address: Some(address),
            items,
            additional_services: None,
        })
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(order)
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderDetail>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders \
             WHERE ($1::uuid IS NULL OR user_id = $1) \
               AND ($2::uuid IS NULL OR id = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(filter.user_id)
        .bind(filter.order_id)
        .fetch_all(self.pool())
        .await?;

        self.attach_details(orders, false).await
    }

    async fn get_order_detail(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(order) = self.get_order(id).await? else {
            return Ok(None);
        };
        Ok(self.attach_details(vec![order], true).await?.pop())
    }

    async fn find_order_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE payment_intent_id = $1"
        ))
        .bind(payment_intent_id)
        .fetch_optional(self.pool())
        .await?;

        match order {
            Some(order) => Ok(self.attach_details(vec![order], false).await?.pop()),
            None => Ok(None),
        }
    }

    async fn update_order(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE shop.orders \
             SET status = COALESCE($2, status), \
                 payment_status = COALESCE($3, payment_status), \
                 updated_at = $4 \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(update.status)
        .bind(update.payment_status)
        .bind(Utc::now())
        .fetch_optional(self.pool())
        .await?;
        Ok(order)
    }

    async fn bulk_delete_orders(
        &self,
        ids: &[OrderId],
    ) -> Result<BulkDeleteOutcome, RepositoryError> {
        let ids: Vec<Uuid> = ids.iter().map(OrderId::as_uuid).collect();
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM shop.order_items WHERE order_id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM shop.order_additional_services WHERE order_id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;

        let address_ids: Vec<AddressId> = sqlx::query_scalar(
            "SELECT DISTINCT address_id FROM shop.orders \
             WHERE id = ANY($1) AND address_id IS NOT NULL",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

        let deleted_ids: Vec<OrderId> =
            sqlx::query_scalar("DELETE FROM shop.orders WHERE id = ANY($1) RETURNING id")
                .bind(&ids)
                .fetch_all(&mut *tx)
                .await?;

        let removed_addresses = delete_orphaned_addresses(&mut tx, &address_ids).await?;

        tx.commit().await?;

        Ok(BulkDeleteOutcome {
            deleted_ids,
            removed_addresses,
        })
    }
}

/// Delete each address that no remaining order references.
async fn delete_orphaned_addresses(
    tx: &mut Transaction<'_, Postgres>,
    candidates: &[AddressId],
) -> Result<Vec<AddressId>, RepositoryError> {
    let mut removed = Vec::new();
    for address_id in candidates {
        let deleted: Option<AddressId> = sqlx::query_scalar(
            "DELETE FROM shop.addresses a \
             WHERE a.id = $1 \
               AND NOT EXISTS (SELECT 1 FROM shop.orders o WHERE o.address_id = $1) \
             RETURNING a.id",
        )
        .bind(address_id)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(id) = deleted {
            removed.push(id);
        }
    }
    Ok(removed)
}

impl PgStore {
    /// Join address, item, and optionally extra-service rows onto orders,
    /// preserving the input order.
    async fn attach_details(
        &self,
        orders: Vec<Order>,
        with_services: bool,
    ) -> Result<Vec<OrderDetail>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
        let address_ids: Vec<Uuid> = orders
            .iter()
            .filter_map(|o| o.address_id.map(|a| a.as_uuid()))
            .collect();

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM shop.order_items \
             WHERE order_id = ANY($1) ORDER BY created_at, id"
        ))
        .bind(&order_ids)
        .fetch_all(self.pool())
        .await?;

        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM shop.addresses WHERE id = ANY($1)"
        ))
        .bind(&address_ids)
        .fetch_all(self.pool())
        .await?;

        let services = if with_services {
            sqlx::query_as::<_, AdditionalService>(
                "SELECT id, order_id, name, price, created_at \
                 FROM shop.order_additional_services \
                 WHERE order_id = ANY($1) ORDER BY created_at, id",
            )
            .bind(&order_ids)
            .fetch_all(self.pool())
            .await?
        } else {
            Vec::new()
        };

        Ok(assemble_details(
            orders,
            addresses,
            items,
            with_services.then_some(services),
        ))
    }
}

/// Group child rows under their orders.
pub(crate) fn assemble_details(
    orders: Vec<Order>,
    addresses: Vec<Address>,
    items: Vec<OrderItem>,
    services: Option<Vec<AdditionalService>>,
) -> Vec<OrderDetail> {
    let addresses: HashMap<AddressId, Address> =
        addresses.into_iter().map(|a| (a.id, a)).collect();

    let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in items {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let with_services = services.is_some();
    let mut services_by_order: HashMap<OrderId, Vec<AdditionalService>> = HashMap::new();
    for service in services.unwrap_or_default() {
        services_by_order
            .entry(service.order_id)
            .or_default()
            .push(service);
    }

    orders
        .into_iter()
        .map(|order| OrderDetail {
            address: order.address_id.and_then(|a| addresses.get(&a).cloned()),
            items: items_by_order.remove(&order.id).unwrap_or_default(),
            additional_services: with_services
                .then(|| services_by_order.remove(&order.id).unwrap_or_default()),
            order,
        })
        .collect()
}
