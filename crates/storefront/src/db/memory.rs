//! In-memory store.
//!
//! Intended for tests and local demos. Mirrors the `PgStore` semantics
//! (ordering, scoping, orphan-address cleanup) without a database. A single
//! write lock per operation stands in for a transaction.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use cemento_core::{
    AddressId, Email, EnquiryId, EnquiryStatus, NotificationId, OrderId, OrderItemId,
    OrderStatus, PaymentStatus, ProductId, ProductStatus, UserId, UserRole,
};

use super::orders::assemble_details;
use super::{
    AnalyticsRepository, CatalogRepository, EnquiryRepository, NotificationRepository,
    OrderRepository, ProfileRepository, RepositoryError, Store,
};
use crate::models::{
    AdditionalService, Address, BulkDeleteOutcome, DatedAmount, Enquiry, LowStockProduct,
    NewEnquiry, NewNotification, NewOrder, NewProduct, Notification, Order, OrderActivity,
    OrderDetail, OrderFilter, OrderItem, OrderUpdate, Product, Profile, SoldItem,
};

#[derive(Debug, Default)]
struct Tables {
    orders: HashMap<OrderId, Order>,
    items: Vec<OrderItem>,
    services: Vec<AdditionalService>,
    addresses: HashMap<AddressId, Address>,
    notifications: Vec<Notification>,
    products: Vec<Product>,
    enquiries: Vec<Enquiry>,
    profiles: HashMap<UserId, Profile>,
}

impl Tables {
    fn details(&self, orders: Vec<Order>, with_services: bool) -> Vec<OrderDetail> {
        let ids: BTreeSet<OrderId> = orders.iter().map(|o| o.id).collect();
        let addresses = orders
            .iter()
            .filter_map(|o| o.address_id)
            .filter_map(|a| self.addresses.get(&a).cloned())
            .collect();
        let items = self
            .items
            .iter()
            .filter(|i| ids.contains(&i.order_id))
            .cloned()
            .collect();
        let services = with_services.then(|| {
            self.services
                .iter()
                .filter(|s| ids.contains(&s.order_id))
                .cloned()
                .collect()
        });
        assemble_details(orders, addresses, items, services)
    }
}

/// In-memory implementation of [`Store`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    enquiries_unavailable: AtomicBool,
    notifications_unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every enquiry query fail, as if the table were unreachable.
    pub fn set_enquiries_unavailable(&self, unavailable: bool) {
        self.enquiries_unavailable
            .store(unavailable, Ordering::SeqCst);
    }

    /// Make notification inserts fail, as if the table were unreachable.
    pub fn set_notifications_unavailable(&self, unavailable: bool) {
        self.notifications_unavailable
            .store(unavailable, Ordering::SeqCst);
    }

    /// Rewrite an order's creation time (for windowed analytics).
    pub async fn backdate_order(&self, id: OrderId, created_at: DateTime<Utc>) -> bool {
        let mut tables = self.tables.write().await;
        tables.orders.get_mut(&id).is_some_and(|order| {
            order.created_at = created_at;
            true
        })
    }

    /// Attach an extra service to an existing order.
    pub async fn add_additional_service(
        &self,
        order_id: OrderId,
        name: &str,
        price: rust_decimal::Decimal,
    ) -> Option<AdditionalService> {
        let mut tables = self.tables.write().await;
        if !tables.orders.contains_key(&order_id) {
            return None;
        }
        let service = AdditionalService {
            id: cemento_core::AdditionalServiceId::generate(),
            order_id,
            name: name.to_owned(),
            price,
            created_at: Utc::now(),
        };
        tables.services.push(service.clone());
        Some(service)
    }

    /// Whether an address row still exists.
    pub async fn address_exists(&self, id: AddressId) -> bool {
        self.tables.read().await.addresses.contains_key(&id)
    }

    /// Point an order at an existing address (shared-address scenarios).
    pub async fn reassign_address(&self, order_id: OrderId, address_id: AddressId) -> bool {
        let mut tables = self.tables.write().await;
        if !tables.addresses.contains_key(&address_id) {
            return false;
        }
        tables.orders.get_mut(&order_id).is_some_and(|order| {
            order.address_id = Some(address_id);
            true
        })
    }

    fn check_enquiries(&self) -> Result<(), RepositoryError> {
        check_available(&self.enquiries_unavailable, "shop.enquiries")
    }

    fn check_notifications(&self) -> Result<(), RepositoryError> {
        check_available(&self.notifications_unavailable, "shop.notifications")
    }
}

fn check_available(flag: &AtomicBool, relation: &str) -> Result<(), RepositoryError> {
    if flag.load(Ordering::SeqCst) {
        return Err(RepositoryError::Database(sqlx::Error::Protocol(format!(
            "relation \"{relation}\" is unavailable"
        ))));
    }
    Ok(())
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(&self, new: NewOrder) -> Result<OrderDetail, RepositoryError> {
        let mut tables = self.tables.write().await;

        if tables
            .orders
            .values()
            .any(|o| o.payment_intent_id.as_deref() == Some(new.payment_intent_id.as_str()))
        {
            return Err(RepositoryError::Conflict(
                "order for this payment intent already exists".to_owned(),
            ));
        }

        let now = Utc::now();
        let address = Address {
            id: AddressId::generate(),
            user_id: new.user_id,
            full_name: new.address.full_name,
            phone: new.address.phone,
            line1: new.address.line1,
            line2: new.address.line2,
            city: new.address.city,
            state: new.address.state,
            postal_code: new.address.postal_code,
            country: new.address.country.unwrap_or_else(|| "IN".to_owned()),
            created_at: now,
        };
        let order = Order {
            id: OrderId::generate(),
            user_id: new.user_id,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_intent_id: Some(new.payment_intent_id),
            subtotal: new.totals.subtotal,
            shipping_cost: new.totals.shipping_cost,
            tax: new.totals.tax,
            total: new.totals.total()?,
            address_id: Some(address.id),
            created_at: now,
            updated_at: now,
        };
        let items: Vec<OrderItem> = new
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: OrderItemId::generate(),
                order_id: order.id,
                product_id: item.product_id,
                product_name: item.product_name,
                price: item.price,
                quantity: item.quantity,
                variant_type: item.variant_type,
                image_url: item.image_url,
                created_at: now,
            })
            .collect();

        tables.addresses.insert(address.id, address.clone());
        tables.orders.insert(order.id, order.clone());
        tables.items.extend(items.iter().cloned());

        Ok(OrderDetail {
            order,
            address: Some(address),
            items,
            additional_services: None,
        })
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderDetail>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| filter.user_id.is_none_or(|u| o.user_id == u))
            .filter(|o| filter.order_id.is_none_or(|id| o.id == id))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tables.details(orders, false))
    }

    async fn get_order_detail(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let tables = self.tables.read().await;
        let Some(order) = tables.orders.get(&id).cloned() else {
            return Ok(None);
        };
        Ok(tables.details(vec![order], true).pop())
    }

    async fn find_order_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let tables = self.tables.read().await;
        let order = tables
            .orders
            .values()
            .find(|o| o.payment_intent_id.as_deref() == Some(payment_intent_id))
            .cloned();
        Ok(order.and_then(|o| tables.details(vec![o], false).pop()))
    }

    async fn update_order(
        &self,
        id: OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(order) = tables.orders.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(status) = update.status {
            order.status = status;
        }
        if let Some(payment_status) = update.payment_status {
            order.payment_status = payment_status;
        }
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn bulk_delete_orders(
        &self,
        ids: &[OrderId],
    ) -> Result<BulkDeleteOutcome, RepositoryError> {
        let mut tables = self.tables.write().await;
        let ids: BTreeSet<OrderId> = ids.iter().copied().collect();

        tables.items.retain(|i| !ids.contains(&i.order_id));
        tables.services.retain(|s| !ids.contains(&s.order_id));

        let captured: BTreeSet<AddressId> = ids
            .iter()
            .filter_map(|id| tables.orders.get(id))
            .filter_map(|o| o.address_id)
            .collect();

        let deleted_ids: Vec<OrderId> = ids
            .iter()
            .filter(|id| tables.orders.remove(id).is_some())
            .copied()
            .collect();

        let mut removed_addresses = Vec::new();
        for address_id in captured {
            let still_referenced = tables
                .orders
                .values()
                .any(|o| o.address_id == Some(address_id));
            if !still_referenced && tables.addresses.remove(&address_id).is_some() {
                removed_addresses.push(address_id);
            }
        }

        Ok(BulkDeleteOutcome {
            deleted_ids,
            removed_addresses,
        })
    }
}

#[async_trait::async_trait]
impl NotificationRepository for MemoryStore {
    async fn create_notification(
        &self,
        new: NewNotification,
    ) -> Result<Notification, RepositoryError> {
        self.check_notifications()?;
        let now = Utc::now();
        let notification = Notification {
            id: NotificationId::generate(),
            user_id: new.user_id,
            title: new.title,
            message: new.message,
            kind: new.kind,
            read: false,
            order_id: new.order_id,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        // Insertion order breaks ties between identical timestamps, newest first.
        rows.reverse();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .is_some_and(|n| {
                n.read = true;
                n.updated_at = now;
                true
            }))
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut updated = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            n.read = true;
            n.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_notification(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        let before = tables.notifications.len();
        tables
            .notifications
            .retain(|n| !(n.id == id && n.user_id == user_id));
        Ok(tables.notifications.len() < before)
    }

    async fn clear_notifications(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.write().await;
        let before = tables.notifications.len();
        tables.notifications.retain(|n| n.user_id != user_id);
        Ok((before - tables.notifications.len()) as u64)
    }

    async fn unread_notification_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let tables = self.tables.read().await;
        let count = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count();
        i64::try_from(count).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
    }
}

#[async_trait::async_trait]
impl AnalyticsRepository for MemoryStore {
    async fn paid_order_amounts(&self) -> Result<Vec<DatedAmount>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .filter(|o| o.payment_status == PaymentStatus::Paid)
            .map(|o| DatedAmount {
                amount: o.total,
                created_at: o.created_at,
            })
            .collect())
    }

    async fn order_timestamps(&self) -> Result<Vec<DateTime<Utc>>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.orders.values().map(|o| o.created_at).collect())
    }

    async fn sold_items_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SoldItem>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .filter(|i| {
                tables
                    .orders
                    .get(&i.order_id)
                    .is_some_and(|o| o.created_at >= start && o.created_at < end)
            })
            .map(|i| SoldItem {
                product_name: i.product_name.clone(),
                quantity: i.quantity,
            })
            .collect())
    }

    async fn orders_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderActivity>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .filter(|o| o.created_at >= start && o.created_at < end)
            .map(|o| OrderActivity {
                user_id: o.user_id,
                total: o.total,
                payment_status: o.payment_status,
                created_at: o.created_at,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl CatalogRepository for MemoryStore {
    async fn create_product(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let product = Product {
            id: ProductId::generate(),
            name: new.name,
            status: new.status,
            is_active: new.is_active,
            stock_quantity: new.stock_quantity,
            created_at: new.created_at.unwrap_or_else(Utc::now),
        };
        self.tables.write().await.products.push(product.clone());
        Ok(product)
    }

    async fn published_product_timestamps(&self) -> Result<Vec<DateTime<Utc>>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .filter(|p| p.status == ProductStatus::Published)
            .map(|p| p.created_at)
            .collect())
    }

    async fn low_stock_products(
        &self,
        threshold: i32,
        limit: i64,
    ) -> Result<Vec<LowStockProduct>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<LowStockProduct> = tables
            .products
            .iter()
            .filter(|p| {
                p.stock_quantity < threshold && p.status == ProductStatus::Published && p.is_active
            })
            .map(|p| LowStockProduct {
                name: p.name.clone(),
                stock_quantity: p.stock_quantity,
            })
            .collect();
        rows.sort_by(|a, b| {
            a.stock_quantity
                .cmp(&b.stock_quantity)
                .then_with(|| a.name.cmp(&b.name))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl EnquiryRepository for MemoryStore {
    async fn create_enquiry(&self, new: NewEnquiry) -> Result<Enquiry, RepositoryError> {
        self.check_enquiries()?;
        let enquiry = Enquiry {
            id: EnquiryId::generate(),
            user_id: new.user_id,
            name: new.name,
            email: new.email,
            subject: new.subject,
            message: new.message,
            status: EnquiryStatus::Open,
            reply: None,
            replied_at: None,
            created_at: Utc::now(),
        };
        self.tables.write().await.enquiries.push(enquiry.clone());
        Ok(enquiry)
    }

    async fn list_enquiries(
        &self,
        status: Option<EnquiryStatus>,
    ) -> Result<Vec<Enquiry>, RepositoryError> {
        self.check_enquiries()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Enquiry> = tables
            .enquiries
            .iter()
            .filter(|e| status.is_none_or(|s| e.status == s))
            .cloned()
            .collect();
        rows.reverse();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn reply_to_enquiry(
        &self,
        id: EnquiryId,
        reply: &str,
        replied_at: DateTime<Utc>,
    ) -> Result<Option<Enquiry>, RepositoryError> {
        self.check_enquiries()?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .enquiries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| {
                e.reply = Some(reply.to_owned());
                e.status = EnquiryStatus::Replied;
                e.replied_at = Some(replied_at);
                e.clone()
            }))
    }

    async fn open_enquiry_count(&self) -> Result<i64, RepositoryError> {
        self.check_enquiries()?;
        let tables = self.tables.read().await;
        let count = tables
            .enquiries
            .iter()
            .filter(|e| e.status == EnquiryStatus::Open)
            .count();
        i64::try_from(count).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ProfileRepository for MemoryStore {
    async fn upsert_profile(
        &self,
        user_id: UserId,
        email: &Email,
    ) -> Result<Profile, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables
            .profiles
            .values()
            .any(|p| p.user_id != user_id && &p.email == email)
        {
            return Err(RepositoryError::Conflict(
                "profile with this email already exists".to_owned(),
            ));
        }
        let now = Utc::now();
        let profile = tables
            .profiles
            .entry(user_id)
            .and_modify(|p| {
                p.email = email.clone();
                p.updated_at = now;
            })
            .or_insert_with(|| Profile {
                user_id,
                email: email.clone(),
                role: UserRole::Customer,
                created_at: now,
                updated_at: now,
            });
        Ok(profile.clone())
    }

    async fn set_profile_role(
        &self,
        email: &Email,
        role: UserRole,
    ) -> Result<Option<Profile>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .profiles
            .values_mut()
            .find(|p| &p.email == email)
            .map(|p| {
                p.role = role;
                p.updated_at = Utc::now();
                p.clone()
            }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use cemento_core::{NotificationType, OrderTotals};

    use super::*;
    use crate::models::{NewAddress, NewOrderItem};

    fn new_order(user_id: UserId, intent: &str) -> NewOrder {
        NewOrder {
            user_id,
            payment_intent_id: intent.to_owned(),
            totals: OrderTotals::new(Decimal::new(1000, 0), Decimal::new(100, 0), Decimal::new(180, 0)),
            address: NewAddress {
                full_name: "Anil Kumar".to_owned(),
                phone: Some("+91 98450 00000".to_owned()),
                line1: "12 Industrial Estate".to_owned(),
                line2: None,
                city: "Pune".to_owned(),
                state: "MH".to_owned(),
                postal_code: "411019".to_owned(),
                country: None,
            },
            items: vec![NewOrderItem {
                product_id: None,
                product_name: "OPC 53 Grade Cement".to_owned(),
                price: Decimal::new(400, 0),
                quantity: 2,
                variant_type: Some("50kg bag".to_owned()),
                image_url: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_create_order_computes_total_and_defaults() {
        let store = MemoryStore::new();
        let detail = store
            .create_order(new_order(UserId::generate(), "pi_1"))
            .await
            .unwrap();

        assert_eq!(detail.order.total, Decimal::new(1280, 0));
        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.order.payment_status, PaymentStatus::Pending);
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.address.unwrap().country, "IN");
    }

    #[tokio::test]
    async fn test_duplicate_payment_intent_conflicts() {
        let store = MemoryStore::new();
        let user = UserId::generate();
        store.create_order(new_order(user, "pi_dup")).await.unwrap();
        let err = store.create_order(new_order(user, "pi_dup")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_orders_is_scoped_and_newest_first() {
        let store = MemoryStore::new();
        let alice = UserId::generate();
        let bob = UserId::generate();
        let older = store.create_order(new_order(alice, "pi_a1")).await.unwrap();
        let newer = store.create_order(new_order(alice, "pi_a2")).await.unwrap();
        store.create_order(new_order(bob, "pi_b1")).await.unwrap();
        store
            .backdate_order(older.order.id, Utc::now() - chrono::Duration::days(2))
            .await;

        let listed = store
            .list_orders(OrderFilter {
                user_id: Some(alice),
                order_id: None,
            })
            .await
            .unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].order.id, newer.order.id);
        assert_eq!(listed[1].order.id, older.order.id);
        assert!(listed.iter().all(|d| d.additional_services.is_none()));
    }

    #[tokio::test]
    async fn test_bulk_delete_removes_shared_orphan_address() {
        let store = MemoryStore::new();
        let user = UserId::generate();
        let a = store.create_order(new_order(user, "pi_a")).await.unwrap();
        let b = store.create_order(new_order(user, "pi_b")).await.unwrap();
        let shared = a.order.address_id.unwrap();
        let b_own = b.order.address_id.unwrap();
        store.reassign_address(b.order.id, shared).await;

        let outcome = store
            .bulk_delete_orders(&[a.order.id, b.order.id])
            .await
            .unwrap();

        assert_eq!(outcome.deleted_ids.len(), 2);
        assert_eq!(outcome.removed_addresses, vec![shared]);
        assert!(!store.address_exists(shared).await);
        // b's original address was already detached from every order.
        assert!(store.address_exists(b_own).await);
        assert!(store.get_order_detail(a.order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_delete_keeps_address_referenced_by_survivor() {
        let store = MemoryStore::new();
        let user = UserId::generate();
        let a = store.create_order(new_order(user, "pi_a")).await.unwrap();
        let c = store.create_order(new_order(user, "pi_c")).await.unwrap();
        let shared = a.order.address_id.unwrap();
        store.reassign_address(c.order.id, shared).await;

        let outcome = store.bulk_delete_orders(&[a.order.id]).await.unwrap();

        assert_eq!(outcome.deleted_ids, vec![a.order.id]);
        assert!(outcome.removed_addresses.is_empty());
        assert!(store.address_exists(shared).await);
        let survivor = store.get_order_detail(c.order.id).await.unwrap().unwrap();
        assert_eq!(survivor.address.unwrap().id, shared);
    }

    #[tokio::test]
    async fn test_bulk_delete_drops_items_and_services() {
        let store = MemoryStore::new();
        let a = store
            .create_order(new_order(UserId::generate(), "pi_a"))
            .await
            .unwrap();
        store
            .add_additional_service(a.order.id, "Unloading", Decimal::new(250, 0))
            .await
            .unwrap();

        store.bulk_delete_orders(&[a.order.id]).await.unwrap();

        let tables = store.tables.read().await;
        assert!(tables.items.is_empty());
        assert!(tables.services.is_empty());
    }

    #[tokio::test]
    async fn test_notifications_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let stranger = UserId::generate();
        let created = store
            .create_notification(NewNotification {
                user_id: owner,
                title: "Order Placed".to_owned(),
                message: "hello".to_owned(),
                kind: NotificationType::Order,
                order_id: None,
            })
            .await
            .unwrap();

        assert!(!store.mark_notification_read(stranger, created.id).await.unwrap());
        assert!(!store.delete_notification(stranger, created.id).await.unwrap());
        assert_eq!(store.unread_notification_count(owner).await.unwrap(), 1);
        assert!(store.mark_notification_read(owner, created.id).await.unwrap());
        assert_eq!(store.unread_notification_count(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_enquiry_failure_toggle() {
        let store = MemoryStore::new();
        store.set_enquiries_unavailable(true);
        assert!(store.open_enquiry_count().await.is_err());
        store.set_enquiries_unavailable(false);
        assert_eq!(store.open_enquiry_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_notification_failure_toggle() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let new = NewNotification {
            user_id: owner,
            title: "Order Placed".to_owned(),
            message: "Your order has been placed".to_owned(),
            kind: NotificationType::Order,
            order_id: None,
        };

        store.set_notifications_unavailable(true);
        assert!(store.create_notification(new.clone()).await.is_err());
        store.set_notifications_unavailable(false);
        store.create_notification(new).await.unwrap();
        assert_eq!(store.unread_notification_count(owner).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_profile_keeps_role() {
        let store = MemoryStore::new();
        let user = UserId::generate();
        let email = Email::parse("foreman@site.in").unwrap();
        store.upsert_profile(user, &email).await.unwrap();
        store
            .set_profile_role(&email, UserRole::Staff)
            .await
            .unwrap()
            .unwrap();

        let again = store.upsert_profile(user, &email).await.unwrap();
        assert_eq!(again.role, UserRole::Staff);
    }
}
