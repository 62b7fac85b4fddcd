//! Staff surface: order management, bulk delete, KPI metrics, enquiries.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use cemento_core::{AddressId, Email, OrderId, ProductStatus};
use cemento_integration_tests::{TestApp, customer, staff};
use cemento_storefront::config::Environment;
use cemento_storefront::db::{CatalogRepository, EnquiryRepository};
use cemento_storefront::models::{NewEnquiry, NewProduct};

fn order_id(id: &str) -> OrderId {
    OrderId::parse(id).unwrap()
}

fn approx(value: &Value, expected: f64) -> bool {
    value
        .as_f64()
        .is_some_and(|v| (v - expected).abs() < 1e-9)
}

async fn address_of(app: &TestApp, id: &str) -> AddressId {
    let uri = format!("/api/admin/orders/{id}");
    let (_, body) = app.send(Some(&staff()), Method::GET, &uri, None).await;
    AddressId::parse(body["order"]["address_id"].as_str().unwrap()).unwrap()
}

async fn mark_paid(app: &TestApp, id: &str) {
    let uri = format!("/api/admin/orders/{id}");
    let (status, body) = app
        .send(
            Some(&staff()),
            Method::PATCH,
            &uri,
            Some(json!({ "payment_status": "paid" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

async fn open_enquiry(app: &TestApp, user_id: Option<cemento_core::UserId>) -> String {
    app.store
        .create_enquiry(NewEnquiry {
            user_id,
            name: "Ravi Kumar".to_string(),
            email: Email::parse("ravi.kumar@example.in").unwrap(),
            subject: "Bulk pricing".to_string(),
            message: "Price for 500 bags?".to_string(),
        })
        .await
        .unwrap()
        .id
        .to_string()
}

#[tokio::test]
async fn test_staff_routes_reject_customers_and_anonymous() {
    let app = TestApp::spawn().await;
    let routes = [
        (Method::GET, "/api/admin/orders/select"),
        (Method::GET, "/api/admin/kpi-metrics"),
        (Method::GET, "/api/admin/enquiries"),
        (Method::GET, "/api/ai-insights/daily-summary"),
    ];

    for (method, uri) in routes {
        let (status, body) = app.send(None, method.clone(), uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "Authentication required");

        let (status, body) = app.send(Some(&customer()), method, uri, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"], "Staff access required");
    }

    let (status, _) = app
        .send(
            Some(&customer()),
            Method::DELETE,
            "/api/orders/delete",
            Some(json!({ "ids": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_select_show_and_update() {
    let app = TestApp::spawn().await;
    let admin = staff();
    let id = app.place_order(&customer(), "pi_staff1").await;
    app.store
        .add_additional_service(order_id(&id), "Unloading", rust_decimal::Decimal::from(150))
        .await
        .unwrap();

    let (status, body) = app
        .send(Some(&admin), Method::GET, "/api/admin/orders/select", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);

    let uri = format!("/api/admin/orders/{id}");
    let (status, body) = app.send(Some(&admin), Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["additional_services"][0]["name"], "Unloading");

    let (status, body) = app
        .send(
            Some(&admin),
            Method::PATCH,
            &uri,
            Some(json!({ "status": "shipped", "payment_status": "paid" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["order"]["status"], "shipped");
    assert_eq!(body["order"]["payment_status"], "paid");

    let (status, _) = app
        .send(Some(&admin), Method::PATCH, &uri, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Some(&admin), Method::GET, "/api/admin/orders/not-a-uuid", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = format!("/api/admin/orders/{}", OrderId::generate());
    let (status, _) = app.send(Some(&admin), Method::GET, &missing, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_delete_removes_orphaned_shared_address() {
    let app = TestApp::spawn().await;
    let user = customer();
    let a = app.place_order(&user, "pi_bulk_a").await;
    let b = app.place_order(&user, "pi_bulk_b").await;
    let shared = address_of(&app, &a).await;
    assert!(app.store.reassign_address(order_id(&b), shared).await);

    let (status, body) = app
        .send(
            Some(&staff()),
            Method::DELETE,
            "/api/orders/delete",
            Some(json!({ "ids": [a, b] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["deletedIds"].as_array().unwrap().len(), 2);
    assert!(body["message"].is_string());

    assert!(!app.store.address_exists(shared).await);
}

#[tokio::test]
async fn test_bulk_delete_keeps_address_still_referenced() {
    let app = TestApp::spawn().await;
    let user = customer();
    let a = app.place_order(&user, "pi_keep_a").await;
    let c = app.place_order(&user, "pi_keep_c").await;
    let shared = address_of(&app, &a).await;
    assert!(app.store.reassign_address(order_id(&c), shared).await);

    let (status, body) = app
        .send(
            Some(&staff()),
            Method::DELETE,
            "/api/orders/delete",
            Some(json!({ "ids": [a] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedIds"], json!([a]));
    assert!(app.store.address_exists(shared).await);

    let uri = format!("/api/admin/orders/{c}");
    let (status, _) = app.send(Some(&staff()), Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bulk_delete_validates_ids() {
    let app = TestApp::spawn().await;
    let admin = staff();

    for body in [json!({}), json!({ "ids": [] }), json!({ "ids": ["nope"] })] {
        let (status, _) = app
            .send(Some(&admin), Method::DELETE, "/api/orders/delete", Some(body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_kpi_metrics_windows_and_exclusions() {
    let app = TestApp::spawn().await;
    let user = customer();
    let now = Utc::now();

    let recent_a = app.place_order(&user, "pi_kpi_a").await;
    let recent_b = app.place_order(&user, "pi_kpi_b").await;
    let previous = app.place_order(&user, "pi_kpi_c").await;
    app.place_order(&user, "pi_kpi_pending").await;
    for id in [&recent_a, &recent_b, &previous] {
        mark_paid(&app, id).await;
    }
    assert!(
        app.store
            .backdate_order(order_id(&previous), now - Duration::days(45))
            .await
    );

    for (status, age) in [
        (ProductStatus::Published, 2),
        (ProductStatus::Published, 40),
        (ProductStatus::Draft, 1),
    ] {
        app.store
            .create_product(NewProduct {
                name: "OPC 53 Grade Cement (50kg)".to_string(),
                status,
                is_active: true,
                stock_quantity: 500,
                created_at: Some(now - Duration::days(age)),
            })
            .await
            .unwrap();
    }
    open_enquiry(&app, None).await;

    let (status, body) = app
        .send(Some(&staff()), Method::GET, "/api/admin/kpi-metrics", None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Pending order is excluded from revenue: 3 paid orders of 930.
    assert!(approx(&body["totalRevenue"], 2790.0), "{body}");
    assert!(approx(&body["revenueGrowth"], 100.0), "{body}");
    assert_eq!(body["totalOrders"], 4);
    assert!(approx(&body["ordersGrowth"], 200.0), "{body}");
    assert_eq!(body["totalProducts"], 2);
    assert!(approx(&body["productsGrowth"], 0.0), "{body}");
    assert_eq!(body["totalEnquiries"], 1);
}

#[tokio::test]
async fn test_kpi_metrics_survive_enquiry_failure() {
    let app = TestApp::spawn().await;
    open_enquiry(&app, None).await;
    app.store.set_enquiries_unavailable(true);

    let (status, body) = app
        .send(Some(&staff()), Method::GET, "/api/admin/kpi-metrics", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalEnquiries"], 0);
    assert!(approx(&body["revenueGrowth"], 0.0));
}

#[tokio::test]
async fn test_empty_store_kpis_are_zero() {
    let app = TestApp::spawn_in(Environment::Production).await;

    let (status, body) = app
        .send(Some(&staff()), Method::GET, "/api/admin/kpi-metrics", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["totalRevenue"], 0.0));
    assert_eq!(body["totalOrders"], 0);
    assert_eq!(body["totalProducts"], 0);
}

#[tokio::test]
async fn test_daily_summary_placeholder_on_empty_store() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(
            Some(&staff()),
            Method::GET,
            "/api/ai-insights/daily-summary",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["topProduct"]["name"], "No sales yet");
    assert_eq!(body["topProduct"]["quantity"], 0);
    assert_eq!(body["newCustomers"], 0);
    assert_eq!(
        body["date"],
        (Utc::now().date_naive() - Duration::days(1)).to_string()
    );
}

#[tokio::test]
async fn test_enquiry_reply_notifies_customer() {
    let app = TestApp::spawn().await;
    let user = customer();
    let id = open_enquiry(&app, Some(user.id)).await;

    let (status, body) = app
        .send(
            Some(&staff()),
            Method::GET,
            "/api/admin/enquiries?status=open",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enquiries"].as_array().unwrap().len(), 1);

    let uri = format!("/api/admin/enquiries/{id}/reply");
    let (status, body) = app
        .send(
            Some(&staff()),
            Method::POST,
            &uri,
            Some(json!({ "reply": "Rs 380 per bag for 500 bags." })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["notified"], true);
    assert_eq!(body["enquiry"]["status"], "replied");
    assert!(body["enquiry"]["replied_at"].is_string());

    let (_, body) = app
        .send(Some(&user), Method::GET, "/api/notifications", None)
        .await;
    let notification = &body["notifications"][0];
    assert_eq!(notification["title"], "Reply to your enquiry");
    assert_eq!(notification["type"], "system");
    assert_eq!(
        notification["message"],
        "We have replied to your enquiry: Bulk pricing"
    );
}

#[tokio::test]
async fn test_enquiry_reply_succeeds_when_notification_fails() {
    let app = TestApp::spawn().await;
    let user = customer();
    let id = open_enquiry(&app, Some(user.id)).await;
    app.store.set_notifications_unavailable(true);

    let uri = format!("/api/admin/enquiries/{id}/reply");
    let (status, body) = app
        .send(
            Some(&staff()),
            Method::POST,
            &uri,
            Some(json!({ "reply": "Rs 380 per bag for 500 bags." })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["notified"], false);
    assert_eq!(body["enquiry"]["status"], "replied");

    let (_, body) = app
        .send(Some(&user), Method::GET, "/api/notifications", None)
        .await;
    assert!(body["notifications"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_enquiry_reply_validation() {
    let app = TestApp::spawn().await;
    let id = open_enquiry(&app, None).await;

    let uri = format!("/api/admin/enquiries/{id}/reply");
    let (status, _) = app
        .send(Some(&staff()), Method::POST, &uri, Some(json!({ "reply": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!(
        "/api/admin/enquiries/{}/reply",
        cemento_core::EnquiryId::generate()
    );
    let (status, body) = app
        .send(Some(&staff()), Method::POST, &uri, Some(json!({ "reply": "Hi" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Enquiry not found");
}
