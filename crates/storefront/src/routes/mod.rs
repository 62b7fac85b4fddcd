//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness
//! GET    /health/ready                        - Readiness (store ping)
//!
//! # Auth (rate limited)
//! POST   /api/auth/session                    - Exchange access token for a session
//! POST   /api/auth/logout                     - Clear the session
//! GET    /api/auth/me                         - Current user
//!
//! # Checkout
//! POST   /api/create-payment-intent           - Create a payment intent
//! POST   /api/verify-payment-intent           - Look up a payment intent
//! POST   /api/orders                          - Place an order
//! POST   /api/orders/confirm                  - Order + intent status
//! GET    /api/orders?user_id=&order_id=       - A user's orders
//! DELETE /api/orders/delete                   - Bulk delete (staff)
//! POST   /api/create-order-notification       - "Order Placed" notification
//!
//! # Notifications (session user)
//! GET    /api/notifications                   - List
//! DELETE /api/notifications                   - Clear all
//! GET    /api/notifications/unread-count      - Unread count
//! PATCH  /api/notifications/read-all          - Mark all read
//! PATCH  /api/notifications/{id}/read         - Mark one read
//! DELETE /api/notifications/{id}              - Delete one
//!
//! # Staff
//! GET    /api/admin/orders/select             - All orders
//! GET    /api/admin/orders/{id}               - Order detail
//! PATCH  /api/admin/orders/{id}               - Update status
//! GET    /api/admin/kpi-metrics               - KPI snapshot
//! GET    /api/admin/enquiries?status=         - Enquiries
//! POST   /api/admin/enquiries/{id}/reply      - Reply to an enquiry
//! GET    /api/ai-insights/daily-summary       - Daily summary
//! ```

pub mod admin;
pub mod auth;
pub mod insights;
pub mod notifications;
pub mod orders;
pub mod payments;

use axum::{
    Router,
    body::Body,
    extract::{FromRequest, FromRequestParts, State},
    http::{Request, StatusCode},
    middleware::from_fn,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::{
    auth_rate_limiter, request_id_middleware, resolve_identity, security_headers_middleware,
};
use crate::state::AppState;

/// JSON body extractor whose rejections are `400` JSON errors.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query-string extractor whose rejections are `400` JSON errors.
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(auth::create_session))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .layer(auth_rate_limiter())
}

/// Create the order and checkout routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/create-payment-intent", post(payments::create_payment_intent))
        .route("/verify-payment-intent", post(payments::verify_payment_intent))
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/confirm", post(orders::confirm))
        .route("/orders/delete", delete(orders::bulk_delete))
        .route(
            "/create-order-notification",
            post(orders::create_notification),
        )
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list).delete(notifications::clear))
        .route("/unread-count", get(notifications::unread_count))
        .route("/read-all", patch(notifications::mark_all_read))
        .route("/{id}/read", patch(notifications::mark_read))
        .route("/{id}", delete(notifications::delete))
}

/// Create the staff routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/select", get(admin::orders::select))
        .route(
            "/orders/{id}",
            get(admin::orders::show).patch(admin::orders::update),
        )
        .route("/kpi-metrics", get(admin::kpi::metrics))
        .route("/enquiries", get(admin::enquiries::list))
        .route("/enquiries/{id}/reply", post(admin::enquiries::reply))
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .merge(order_routes())
        .nest("/notifications", notification_routes())
        .nest("/admin", admin_routes())
        .route("/ai-insights/daily-summary", get(insights::daily_summary))
}

/// Build the application router with health checks, identity resolution,
/// security headers, request ids and request tracing.
///
/// The session layer is added by the caller, outside this router, so the
/// identity middleware can read it.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .layer(from_fn(resolve_identity))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                user_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
