//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The table is
//! `shop.session`, created by the schema migration.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cemento_session";

/// Schema holding the session table.
pub const SESSION_SCHEMA: &str = "shop";

/// Session table name.
pub const SESSION_TABLE: &str = "session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The session store rejected a schema or table name.
#[derive(Debug, Error)]
#[error("invalid session store identifier: {0}")]
pub struct SessionStoreError(String);

/// Create the session layer with `PostgreSQL` store.
///
/// Cookies are `Secure` when the configured base URL is https.
///
/// # Errors
///
/// Returns `SessionStoreError` if the store rejects the schema or table name.
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<PostgresStore>, SessionStoreError> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .map_err(SessionStoreError)?
        .with_table_name(SESSION_TABLE)
        .map_err(SessionStoreError)?;

    let is_secure = config.base_url.starts_with("https://");

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/"))
}
