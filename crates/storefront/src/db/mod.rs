//! Persistent store access.
//!
//! # Database
//!
//! All tables live in the `shop` schema:
//!
//! - `orders`, `order_items`, `order_additional_services`, `addresses`
//! - `notifications`
//! - `products`, `enquiries`
//! - `profiles` - local role mapping for hosted-auth users
//! - `session` - Tower-sessions storage
//!
//! # Store seam
//!
//! Handlers and services talk to an `Arc<dyn Store>`. [`PgStore`] is the
//! production implementation; [`MemoryStore`] backs tests and local demos.
//! Each concern has its own repository trait, and [`Store`] ties them
//! together.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p cemento-cli -- migrate
//! ```

pub mod analytics;
pub mod catalog;
pub mod enquiries;
pub mod memory;
pub mod notifications;
pub mod orders;
pub mod profiles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use cemento_core::MoneyError;

pub use analytics::AnalyticsRepository;
pub use catalog::CatalogRepository;
pub use enquiries::EnquiryRepository;
pub use memory::MemoryStore;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use profiles::ProfileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate payment intent).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A money value could not be computed or stored.
    #[error("invalid amount: {0}")]
    Amount(#[from] MoneyError),
}

impl RepositoryError {
    /// Map unique violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// The full persistent store used by the application.
#[async_trait::async_trait]
pub trait Store:
    OrderRepository
    + NotificationRepository
    + AnalyticsRepository
    + CatalogRepository
    + EnquiryRepository
    + ProfileRepository
    + Send
    + Sync
{
    /// Cheap connectivity check for the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
