//! KPI aggregation engine.
//!
//! Metrics compare two adjacent 30-day windows ending now:
//!
//! ```text
//! previous: (now-60d, now-30d]    recent: (now-30d, now]
//! ```
//!
//! Growth is `(recent - previous) / previous * 100`, or 0 when the previous
//! window is empty. Totals are over every fetched row.
//!
//! Rows are fetched whole and reduced here, so each snapshot scans the orders
//! and products tables. Nothing is cached.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{instrument, warn};

use cemento_core::{PaymentStatus, UserId, format_amount};

use crate::db::{RepositoryError, Store};
use crate::models::{DatedAmount, SoldItem};

/// Length of each comparison window.
pub const WINDOW_DAYS: i64 = 30;

/// Products below this stock level are reported as low.
pub const LOW_STOCK_THRESHOLD: i32 = 100;

const LOW_STOCK_FETCH: i64 = 5;
const LOW_STOCK_SHOWN: usize = 3;

/// Shown when nothing sold in the summary window.
pub const NO_SALES_PLACEHOLDER: &str = "No sales yet";

/// Which comparison window a timestamp falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Recent,
    Previous,
}

/// Classify `ts` relative to `now`. `None` for anything older than two
/// windows or in the future.
#[must_use]
pub fn window_of(ts: DateTime<Utc>, now: DateTime<Utc>) -> Option<Window> {
    let boundary = now - Duration::days(WINDOW_DAYS);
    let oldest = boundary - Duration::days(WINDOW_DAYS);
    if ts > boundary && ts <= now {
        Some(Window::Recent)
    } else if ts > oldest && ts <= boundary {
        Some(Window::Previous)
    } else {
        None
    }
}

/// Percentage change from `previous` to `recent`, rounded to two places.
#[must_use]
pub fn growth(recent: Decimal, previous: Decimal) -> Decimal {
    if previous <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ((recent - previous) / previous * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of amounts in each window: `(recent, previous)`.
#[must_use]
pub fn windowed_sums(rows: &[DatedAmount], now: DateTime<Utc>) -> (Decimal, Decimal) {
    rows.iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(recent, previous), row| {
            match window_of(row.created_at, now) {
                Some(Window::Recent) => (recent + row.amount, previous),
                Some(Window::Previous) => (recent, previous + row.amount),
                None => (recent, previous),
            }
        })
}

/// Number of timestamps in each window: `(recent, previous)`.
#[must_use]
pub fn windowed_counts(timestamps: &[DateTime<Utc>], now: DateTime<Utc>) -> (i64, i64) {
    timestamps
        .iter()
        .fold((0, 0), |(recent, previous), ts| match window_of(*ts, now) {
            Some(Window::Recent) => (recent + 1, previous),
            Some(Window::Previous) => (recent, previous + 1),
            None => (recent, previous),
        })
}

/// Dashboard KPI snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue_growth: Decimal,
    pub total_orders: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub orders_growth: Decimal,
    pub total_products: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub products_growth: Decimal,
    pub total_enquiries: i64,
}

/// Best seller of the summary day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopProduct {
    pub name: String,
    pub quantity: i64,
}

/// Staff daily summary for the previous UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub top_product: TopProduct,
    pub low_stock_products: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    pub new_customers: usize,
    pub insights: Vec<String>,
}

/// The product with the highest summed quantity; ties go to the
/// alphabetically first name.
#[must_use]
pub fn top_product(items: &[SoldItem]) -> TopProduct {
    let mut totals: HashMap<&str, i64> = HashMap::new();
    for item in items {
        *totals.entry(item.product_name.as_str()).or_insert(0) += i64::from(item.quantity);
    }

    totals
        .into_iter()
        .filter(|(_, quantity)| *quantity > 0)
        .max_by(|(a_name, a_qty), (b_name, b_qty)| a_qty.cmp(b_qty).then_with(|| b_name.cmp(a_name)))
        .map_or_else(
            || TopProduct {
                name: NO_SALES_PLACEHOLDER.to_owned(),
                quantity: 0,
            },
            |(name, quantity)| TopProduct {
                name: name.to_owned(),
                quantity,
            },
        )
}

/// Human-readable lines for the summary card.
#[must_use]
pub fn summary_insights(
    top: &TopProduct,
    revenue: Decimal,
    low_stock: &[String],
    new_customers: usize,
) -> Vec<String> {
    let mut lines = Vec::new();

    if top.quantity > 0 {
        lines.push(format!(
            "{} was the best seller with {} units sold.",
            top.name, top.quantity
        ));
    } else {
        lines.push("No sales were recorded yesterday.".to_owned());
    }

    lines.push(format!("Paid revenue for the day: {}.", format_amount(revenue)));

    if !low_stock.is_empty() {
        lines.push(format!(
            "Running low on {}. Consider restocking soon.",
            low_stock.join(", ")
        ));
    }

    match new_customers {
        0 => {}
        1 => lines.push("1 customer placed an order in the last 24 hours.".to_owned()),
        n => lines.push(format!("{n} customers placed orders in the last 24 hours.")),
    }

    lines
}

/// Computes KPI snapshots and daily summaries from the store.
pub struct KpiEngine<'a> {
    store: &'a dyn Store,
}

impl<'a> KpiEngine<'a> {
    /// Create a new KPI engine.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Compute the dashboard snapshot as of `now`.
    ///
    /// The open-enquiry count is best effort: if it fails the snapshot
    /// reports 0 enquiries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if revenue, order or product rows cannot be
    /// fetched.
    #[instrument(skip(self))]
    pub async fn snapshot(&self, now: DateTime<Utc>) -> Result<KpiSnapshot, RepositoryError> {
        let (paid, orders, products) = tokio::try_join!(
            self.store.paid_order_amounts(),
            self.store.order_timestamps(),
            self.store.published_product_timestamps(),
        )?;

        let total_enquiries = match self.store.open_enquiry_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Failed to count open enquiries, reporting 0");
                0
            }
        };

        let total_revenue = paid.iter().map(|row| row.amount).sum();
        let (recent_revenue, previous_revenue) = windowed_sums(&paid, now);
        let (recent_orders, previous_orders) = windowed_counts(&orders, now);
        let (recent_products, previous_products) = windowed_counts(&products, now);

        Ok(KpiSnapshot {
            total_revenue,
            revenue_growth: growth(recent_revenue, previous_revenue),
            total_orders: count(orders.len()),
            orders_growth: growth(recent_orders.into(), previous_orders.into()),
            total_products: count(products.len()),
            products_growth: growth(recent_products.into(), previous_products.into()),
            total_enquiries,
        })
    }

    /// Summarise the UTC day before `now`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any of the underlying reads fail.
    #[instrument(skip(self))]
    pub async fn daily_summary(&self, now: DateTime<Utc>) -> Result<DailySummary, RepositoryError> {
        let date = now.date_naive() - Duration::days(1);
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        let (sold, day_orders, last_24h, low_stock) = tokio::try_join!(
            self.store.sold_items_between(day_start, day_end),
            self.store.orders_between(day_start, day_end),
            self.store.orders_between(now - Duration::hours(24), now),
            self.store
                .low_stock_products(LOW_STOCK_THRESHOLD, LOW_STOCK_FETCH),
        )?;

        let top_product = top_product(&sold);
        let revenue = day_orders
            .iter()
            .filter(|o| o.payment_status == PaymentStatus::Paid)
            .map(|o| o.total)
            .sum();
        let new_customers = last_24h
            .iter()
            .map(|o| o.user_id)
            .collect::<BTreeSet<UserId>>()
            .len();
        let low_stock_products: Vec<String> = low_stock
            .into_iter()
            .take(LOW_STOCK_SHOWN)
            .map(|p| p.name)
            .collect();
        let insights = summary_insights(&top_product, revenue, &low_stock_products, new_customers);

        Ok(DailySummary {
            date,
            top_product,
            low_stock_products,
            revenue,
            new_customers,
            insights,
        })
    }
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cemento_core::{OrderTotals, ProductStatus};

    use super::*;
    use crate::db::{CatalogRepository, MemoryStore, OrderRepository};
    use crate::models::{NewAddress, NewOrder, NewOrderItem, NewProduct, OrderUpdate};

    fn at(days_ago: i64, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(days_ago)
    }

    fn amount(value: i64, created_at: DateTime<Utc>) -> DatedAmount {
        DatedAmount {
            amount: Decimal::new(value, 0),
            created_at,
        }
    }

    #[test]
    fn test_growth_formula() {
        assert_eq!(growth(Decimal::new(150, 0), Decimal::new(100, 0)), Decimal::new(50, 0));
        assert_eq!(growth(Decimal::new(1, 0), Decimal::new(3, 0)), Decimal::new(-6667, 2));
    }

    #[test]
    fn test_growth_is_zero_without_previous() {
        assert_eq!(growth(Decimal::new(500, 0), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(growth(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_growth_when_recent_is_zero() {
        assert_eq!(growth(Decimal::ZERO, Decimal::new(40, 0)), Decimal::new(-100, 0));
    }

    #[test]
    fn test_window_boundaries() {
        let now = Utc::now();
        assert_eq!(window_of(now, now), Some(Window::Recent));
        assert_eq!(window_of(at(30, now), now), Some(Window::Previous));
        assert_eq!(window_of(at(60, now), now), None);
        assert_eq!(window_of(now + Duration::seconds(1), now), None);
    }

    #[test]
    fn test_windowed_sums() {
        let now = Utc::now();
        let rows = [
            amount(100, at(1, now)),
            amount(50, at(29, now)),
            amount(70, at(45, now)),
            amount(999, at(90, now)),
        ];
        assert_eq!(
            windowed_sums(&rows, now),
            (Decimal::new(150, 0), Decimal::new(70, 0))
        );
    }

    #[test]
    fn test_top_product_breaks_ties_by_name() {
        let items = [
            SoldItem {
                product_name: "TMT Bars".to_owned(),
                quantity: 4,
            },
            SoldItem {
                product_name: "OPC Cement".to_owned(),
                quantity: 3,
            },
            SoldItem {
                product_name: "OPC Cement".to_owned(),
                quantity: 1,
            },
        ];
        let top = top_product(&items);
        assert_eq!(top.name, "OPC Cement");
        assert_eq!(top.quantity, 4);
    }

    #[test]
    fn test_top_product_placeholder() {
        let top = top_product(&[]);
        assert_eq!(top.name, NO_SALES_PLACEHOLDER);
        assert_eq!(top.quantity, 0);
    }

    #[test]
    fn test_snapshot_serializes_camel_case_numbers() {
        let snapshot = KpiSnapshot {
            total_revenue: Decimal::new(125_050, 2),
            revenue_growth: Decimal::new(50, 0),
            total_orders: 3,
            orders_growth: Decimal::ZERO,
            total_products: 2,
            products_growth: Decimal::ZERO,
            total_enquiries: 1,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["totalRevenue"], serde_json::json!(1250.5));
        assert_eq!(json["revenueGrowth"], serde_json::json!(50.0));
        assert_eq!(json["totalEnquiries"], 1);
    }

    async fn place(store: &MemoryStore, intent: &str, total: i64, name: &str, qty: i32) -> cemento_core::OrderId {
        let detail = store
            .create_order(NewOrder {
                user_id: UserId::generate(),
                payment_intent_id: intent.to_owned(),
                totals: OrderTotals::new(Decimal::new(total, 0), Decimal::ZERO, Decimal::ZERO),
                address: NewAddress {
                    full_name: "Site Office".to_owned(),
                    phone: None,
                    line1: "Survey No. 7".to_owned(),
                    line2: None,
                    city: "Nashik".to_owned(),
                    state: "MH".to_owned(),
                    postal_code: "422001".to_owned(),
                    country: None,
                },
                items: vec![NewOrderItem {
                    product_id: None,
                    product_name: name.to_owned(),
                    price: Decimal::new(total, 0),
                    quantity: qty,
                    variant_type: None,
                    image_url: None,
                }],
            })
            .await
            .unwrap();
        detail.order.id
    }

    async fn mark_paid(store: &MemoryStore, id: cemento_core::OrderId) {
        store
            .update_order(
                id,
                OrderUpdate {
                    status: None,
                    payment_status: Some(PaymentStatus::Paid),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_revenue_excludes_pending_orders() {
        let store = MemoryStore::new();
        let paid = place(&store, "pi_paid", 1000, "OPC Cement", 1).await;
        mark_paid(&store, paid).await;
        place(&store, "pi_pending", 500, "OPC Cement", 1).await;

        let snapshot = KpiEngine::new(&store).snapshot(Utc::now()).await.unwrap();

        assert_eq!(snapshot.total_revenue, Decimal::new(1000, 0));
        assert_eq!(snapshot.total_orders, 2);
    }

    #[tokio::test]
    async fn test_enquiry_failure_reports_zero() {
        let store = MemoryStore::new();
        store.set_enquiries_unavailable(true);

        let snapshot = KpiEngine::new(&store).snapshot(Utc::now()).await.unwrap();

        assert_eq!(snapshot.total_enquiries, 0);
    }

    #[tokio::test]
    async fn test_snapshot_growth_across_windows() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for (i, days_ago) in [1, 2, 40].into_iter().enumerate() {
            let id = place(&store, &format!("pi_{i}"), 100, "OPC Cement", 1).await;
            mark_paid(&store, id).await;
            store.backdate_order(id, at(days_ago, now)).await;
        }

        let snapshot = KpiEngine::new(&store).snapshot(now).await.unwrap();

        assert_eq!(snapshot.total_revenue, Decimal::new(300, 0));
        assert_eq!(snapshot.revenue_growth, Decimal::new(100, 0));
        assert_eq!(snapshot.orders_growth, Decimal::new(100, 0));
    }

    #[tokio::test]
    async fn test_daily_summary_reports_yesterday() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let yesterday_noon = (now.date_naive() - Duration::days(1))
            .and_time(NaiveTime::MIN)
            .and_utc()
            + Duration::hours(12);

        let a = place(&store, "pi_a", 800, "PPC Cement", 20).await;
        mark_paid(&store, a).await;
        store.backdate_order(a, yesterday_noon).await;
        let b = place(&store, "pi_b", 300, "River Sand", 5).await;
        store.backdate_order(b, yesterday_noon).await;

        for (name, stock) in [("Fly Ash Bricks", 40), ("AAC Blocks", 10), ("M-Sand", 70), ("Grout", 90), ("Ready Mix", 500)] {
            store
                .create_product(NewProduct {
                    name: name.to_owned(),
                    status: ProductStatus::Published,
                    is_active: true,
                    stock_quantity: stock,
                    created_at: None,
                })
                .await
                .unwrap();
        }

        let summary = KpiEngine::new(&store).daily_summary(now).await.unwrap();

        assert_eq!(summary.date, now.date_naive() - Duration::days(1));
        assert_eq!(summary.top_product.name, "PPC Cement");
        assert_eq!(summary.top_product.quantity, 20);
        assert_eq!(summary.revenue, Decimal::new(800, 0));
        assert_eq!(
            summary.low_stock_products,
            vec!["AAC Blocks", "Fly Ash Bricks", "M-Sand"]
        );
        assert!(summary.insights.iter().any(|l| l.contains("Running low")));
    }

    #[tokio::test]
    async fn test_daily_summary_placeholder_without_sales() {
        let store = MemoryStore::new();
        let summary = KpiEngine::new(&store).daily_summary(Utc::now()).await.unwrap();

        assert_eq!(summary.top_product.name, NO_SALES_PLACEHOLDER);
        assert_eq!(summary.top_product.quantity, 0);
        assert_eq!(summary.new_customers, 0);
        assert!(summary.low_stock_products.is_empty());
    }
}
