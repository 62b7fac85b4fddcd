//! Checkout, confirmation and order listing through the HTTP API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use cemento_integration_tests::{TestApp, checkout_body, customer, staff};

#[tokio::test]
async fn test_create_payment_intent_converts_to_minor_units() {
    let app = TestApp::spawn().await;
    let user = customer();

    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .and(body_string_contains("amount=93050"))
        .and(body_string_contains("currency=inr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pi_3Pcheckout",
            "status": "requires_payment_method",
            "amount": 93050,
            "currency": "inr",
            "client_secret": "pi_3Pcheckout_secret_abc"
        })))
        .expect(1)
        .mount(&app.payments)
        .await;

    let (status, body) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/create-payment-intent",
            Some(json!({ "amount": 930.50 })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["clientSecret"], "pi_3Pcheckout_secret_abc");
    assert_eq!(body["paymentIntentId"], "pi_3Pcheckout");
}

#[tokio::test]
async fn test_create_payment_intent_rejects_small_amounts() {
    let app = TestApp::spawn().await;
    let user = customer();

    for body in [json!({}), json!({ "amount": 0.5 }), json!({ "amount": -10 })] {
        let (status, response) = app
            .send(
                Some(&user),
                Method::POST,
                "/api/create-payment-intent",
                Some(body),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Amount must be at least 1");
    }
}

#[tokio::test]
async fn test_verify_payment_intent() {
    let app = TestApp::spawn().await;
    let user = customer();
    app.stub_intent("pi_verify1", "succeeded", 93_000).await;

    let (status, body) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/verify-payment-intent",
            Some(json!({ "paymentIntentId": "pi_verify1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "succeeded");
    assert_eq!(body["amount"], 93_000);
    assert_eq!(body["currency"], "inr");

    let (status, _) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/verify-payment-intent",
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/verify-payment-intent",
            Some(json!({ "paymentIntentId": "pi_missing" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Payment intent not found");
}

#[tokio::test]
async fn test_checkout_then_confirm() {
    let app = TestApp::spawn().await;
    let user = customer();

    let (status, body) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/orders",
            Some(checkout_body("pi_confirm1")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order = &body["order"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_status"], "pending");
    assert_eq!(order["user_id"], user.id.to_string());
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["address"]["city"], "Bengaluru");
    assert_eq!(order["address"]["country"], "IN");
    let total: rust_decimal::Decimal = order["total"].as_str().unwrap().parse().unwrap();
    assert_eq!(total, rust_decimal::Decimal::from(930));

    app.stub_intent("pi_confirm1", "succeeded", 93_000).await;
    let (status, body) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/orders/confirm",
            Some(json!({ "payment_intent_id": "pi_confirm1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["payment_status"], "succeeded");
    assert_eq!(body["amount_received"], 93_000);
    assert_eq!(body["order"]["id"], order["id"]);
    // Confirmation does not touch the stored order.
    assert_eq!(body["order"]["payment_status"], "pending");
}

#[tokio::test]
async fn test_duplicate_payment_intent_is_rejected() {
    let app = TestApp::spawn().await;
    let user = customer();
    app.place_order(&user, "pi_dup").await;

    let (status, body) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/orders",
            Some(checkout_body("pi_dup")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_invalid_checkout_is_rejected() {
    let app = TestApp::spawn().await;
    let user = customer();

    let mut body = checkout_body("pi_bad");
    body["items"] = json!([]);
    let (status, _) = app
        .send(Some(&user), Method::POST, "/api/orders", Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = checkout_body("pi_bad");
    body["shipping_address"]["city"] = json!("  ");
    let (status, response) = app
        .send(Some(&user), Method::POST, "/api/orders", Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "shipping_address.city is required");
}

#[tokio::test]
async fn test_out_of_range_amounts_are_rejected() {
    let app = TestApp::spawn().await;
    let user = customer();

    // Summing these overflows Decimal itself.
    let mut body = checkout_body("pi_huge");
    body["subtotal"] = json!("79228162514264337593543950335");
    body["shipping_cost"] = json!("1");
    let (status, response) = app
        .send(Some(&user), Method::POST, "/api/orders", Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "subtotal must not exceed 9999999999.99");

    // Each part fits, the sum does not.
    let mut body = checkout_body("pi_huge");
    body["subtotal"] = json!("9999999999.99");
    let (status, response) = app
        .send(Some(&user), Method::POST, "/api/orders", Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "total must not exceed 9999999999.99");

    let mut body = checkout_body("pi_huge");
    body["items"][0]["price"] = json!("10000000000");
    let (status, _) = app
        .send(Some(&user), Method::POST, "/api/orders", Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/orders?user_id={}", user.id);
    let (_, body) = app.send(Some(&user), Method::GET, &uri, None).await;
    assert!(body["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_confirm_intent_without_order_is_not_found() {
    let app = TestApp::spawn().await;
    let user = customer();
    app.stub_intent("pi_orphan", "succeeded", 100).await;

    let (status, body) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/orders/confirm",
            Some(json!({ "payment_intent_id": "pi_orphan" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order not found");
}

#[tokio::test]
async fn test_confirm_unknown_intent_is_not_found() {
    let app = TestApp::spawn().await;
    let user = customer();

    // Nothing is mounted for this id, so the processor answers 404.
    let (status, body) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/orders/confirm",
            Some(json!({ "payment_intent_id": "pi_unknown" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_confirm_hides_other_users_orders() {
    let app = TestApp::spawn().await;
    let owner = customer();
    let other = customer();
    app.place_order(&owner, "pi_private").await;
    app.stub_intent("pi_private", "succeeded", 93_000).await;

    let (status, _) = app
        .send(
            Some(&other),
            Method::POST,
            "/api/orders/confirm",
            Some(json!({ "payment_intent_id": "pi_private" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_orders_newest_first_and_scoped() {
    let app = TestApp::spawn().await;
    let user = customer();
    let first = app.place_order(&user, "pi_list1").await;
    let second = app.place_order(&user, "pi_list2").await;
    app.place_order(&customer(), "pi_list3").await;

    let uri = format!("/api/orders?user_id={}", user.id);
    let (status, body) = app.send(Some(&user), Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], second);
    assert_eq!(orders[1]["id"], first);

    let uri = format!("/api/orders?user_id={}&order_id={first}", user.id);
    let (_, body) = app.send(Some(&user), Method::GET, &uri, None).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_orders_requires_own_user_id() {
    let app = TestApp::spawn().await;
    let user = customer();

    let (status, _) = app
        .send(Some(&user), Method::GET, "/api/orders", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/orders?user_id={}", customer().id);
    let (status, _) = app.send(Some(&user), Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Staff may look at anyone's orders.
    let (status, _) = app.send(Some(&staff()), Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_order_placed_notification() {
    let app = TestApp::spawn().await;
    let user = customer();
    let order_id = app.place_order(&user, "pi_notify").await;

    let (status, body) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/create-order-notification",
            Some(json!({ "orderId": order_id, "orderTotal": 930 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, body) = app
        .send(Some(&user), Method::GET, "/api/notifications", None)
        .await;
    let notifications = body["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["title"], "Order Placed");
    assert_eq!(notifications[0]["type"], "order");
    assert_eq!(notifications[0]["read"], false);
    let short = order_id[order_id.len() - 8..].to_uppercase();
    assert!(
        notifications[0]["message"]
            .as_str()
            .unwrap()
            .contains(&format!("#{short}"))
    );
}

#[tokio::test]
async fn test_order_placed_notification_failure_is_a_server_error() {
    let app = TestApp::spawn().await;
    let user = customer();
    let order_id = app.place_order(&user, "pi_notify_down").await;
    app.store.set_notifications_unavailable(true);

    let (status, body) = app
        .send(
            Some(&user),
            Method::POST,
            "/api/create-order-notification",
            Some(json!({ "orderId": order_id, "orderTotal": 930 })),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Database error");

    // The order itself is untouched.
    let uri = format!("/api/orders?user_id={}", user.id);
    let (_, body) = app.send(Some(&user), Method::GET, &uri, None).await;
    assert_eq!(body["orders"][0]["id"], order_id.as_str());
}

#[tokio::test]
async fn test_anonymous_checkout_is_unauthorized() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .send(None, Method::POST, "/api/orders", Some(checkout_body("pi_anon")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");

    let (status, _) = app
        .send(
            None,
            Method::POST,
            "/api/create-order-notification",
            Some(json!({ "orderId": "x", "orderTotal": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
