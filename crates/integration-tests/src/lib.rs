//! Integration tests for Cemento.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (router over the in-memory store, mocked processor)
//! cargo test -p cemento-integration-tests
//!
//! # Live-server tests (needs a running server and database)
//! STOREFRONT_BASE_URL=http://localhost:3000 cargo test -p cemento-integration-tests -- --ignored
//! ```
//!
//! The in-process harness builds the real router over a [`MemoryStore`] with
//! the payment processor replaced by a `wiremock` server. Identity is
//! injected as a `CurrentUser` request extension, which the identity
//! middleware leaves untouched, so no session store is needed.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Extension, Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cemento_core::{Email, UserId, UserRole};
use cemento_storefront::config::{
    AuthConfig, Environment, LogFormat, PaymentConfig, StorefrontConfig,
};
use cemento_storefront::db::{MemoryStore, Store};
use cemento_storefront::models::CurrentUser;
use cemento_storefront::routes;
use cemento_storefront::state::AppState;

/// Address every rate-limited request claims to come from.
pub const CLIENT_IP: &str = "203.0.113.10";

/// Configuration pointing the payment client at `payment_base`.
#[must_use]
pub fn test_config(payment_base: &str, environment: Environment) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/cemento_test"),
        host: [127, 0, 0, 1].into(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        environment,
        payment: PaymentConfig {
            secret_key: SecretString::from("sk_test_4eC39HqLyjWDarjtT1zdp7dc"),
            api_base: Url::parse(payment_base).expect("mock server uri is a valid url"),
            currency: "inr".to_string(),
        },
        auth: AuthConfig {
            url: Url::parse("http://127.0.0.1:9").expect("static url is valid"),
            anon_key: SecretString::from("eyJhbGciOiJIUzI1NiJ9.anon.Qx7vK2p"),
        },
        sentry_dsn: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
        log_format: LogFormat::Text,
    }
}

/// A signed-in user with the given role.
#[must_use]
pub fn user(role: UserRole) -> CurrentUser {
    let id = UserId::generate();
    CurrentUser {
        id,
        email: Email::parse(&format!("user-{id}@cemento.in")).expect("generated email is valid"),
        role,
    }
}

/// A signed-in customer.
#[must_use]
pub fn customer() -> CurrentUser {
    user(UserRole::Customer)
}

/// A signed-in staff member.
#[must_use]
pub fn staff() -> CurrentUser {
    user(UserRole::Staff)
}

/// Router, store and mocked payment processor for one test.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub payments: MockServer,
    state: AppState,
}

impl TestApp {
    /// Build an app in the development environment.
    pub async fn spawn() -> Self {
        Self::spawn_in(Environment::Development).await
    }

    /// Build an app in the given environment.
    pub async fn spawn_in(environment: Environment) -> Self {
        let payments = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn Store> = store.clone();
        let state = AppState::new(test_config(&payments.uri(), environment), shared)
            .expect("state builds from test config");
        Self {
            store,
            payments,
            state,
        }
    }

    /// The application router, optionally acting as `user`.
    #[must_use]
    pub fn router(&self, user: Option<&CurrentUser>) -> Router {
        let router = routes::router(self.state.clone());
        match user {
            Some(user) => router.layer(Extension(user.clone())),
            None => router,
        }
    }

    /// Send one request and decode the response body.
    ///
    /// Non-JSON bodies come back as a JSON string; empty bodies as `null`.
    pub async fn send(
        &self,
        user: Option<&CurrentUser>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", CLIENT_IP);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .router(user)
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Stub `GET /v1/payment_intents/{id}` with the given status and amount.
    pub async fn stub_intent(&self, id: &str, status: &str, amount: i64) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/payment_intents/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "object": "payment_intent",
                "status": status,
                "amount": amount,
                "amount_received": if status == "succeeded" { amount } else { 0 },
                "currency": "inr",
                "client_secret": format!("{id}_secret_test"),
            })))
            .mount(&self.payments)
            .await;
    }

    /// Place an order for `user` through the API and return its id.
    pub async fn place_order(&self, user: &CurrentUser, payment_intent_id: &str) -> String {
        let (status, body) = self
            .send(
                Some(user),
                Method::POST,
                "/api/orders",
                Some(checkout_body(payment_intent_id)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "checkout failed: {body}");
        body["order"]["id"]
            .as_str()
            .expect("order id is a string")
            .to_string()
    }
}

/// A valid checkout: two bags at 400 plus shipping and tax (total 930).
#[must_use]
pub fn checkout_body(payment_intent_id: &str) -> Value {
    json!({
        "payment_intent_id": payment_intent_id,
        "shipping_address": {
            "full_name": "Meera Iyer",
            "phone": "+91 98450 12345",
            "line1": "14 Residency Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "postal_code": "560025"
        },
        "items": [
            {
                "product_name": "OPC 53 Grade Cement (50kg)",
                "price": 400,
                "quantity": 2
            }
        ],
        "subtotal": 800,
        "shipping_cost": 50,
        "tax": 80
    })
}
