//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Session layer (tower-sessions with `PostgreSQL` store)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (record and echo `x-request-id`)
//! 5. Security headers
//! 6. Identity (session user into request extensions)
//! 7. Rate limiting on `/api/auth/*` (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAuth, RequireStaff, clear_current_user, resolve_identity,
    set_current_user,
};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SessionStoreError, create_session_layer};
