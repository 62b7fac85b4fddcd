//! CLI subcommands.

pub mod kpi;
pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use cemento_storefront::db::{self, PgStore, RepositoryError};

/// Errors surfaced by any subcommand.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No profile exists for this email.
    #[error("No profile with email {0}; the user must sign in once first")]
    UnknownUser(String),

    /// Output could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read the storefront database URL, preferring `STOREFRONT_DATABASE_URL`.
fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

/// Connect to the storefront database.
async fn connect() -> Result<PgPool, CliError> {
    let url = database_url()?;
    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&url).await?)
}

/// Connect and wrap the pool in the store used by the server.
async fn store() -> Result<PgStore, CliError> {
    Ok(PgStore::new(connect().await?))
}
