//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::Store;
use crate::payments::{PaymentClient, PaymentError};
use crate::services::auth::{AuthClient, AuthError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("payment client: {0}")]
    Payment(#[from] PaymentError),
    #[error("auth client: {0}")]
    Auth(#[from] AuthError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the store, the external clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn Store>,
    payments: PaymentClient,
    auth: AuthClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Persistent store (`PgStore` in production)
    ///
    /// # Errors
    ///
    /// Returns an error if an external client cannot be built from the config.
    pub fn new(config: StorefrontConfig, store: Arc<dyn Store>) -> Result<Self, StateError> {
        let payments = PaymentClient::new(&config.payment)?;
        let auth = AuthClient::new(&config.auth)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                payments,
                auth,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the persistent store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the payment processor client.
    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    /// Get a reference to the hosted auth client.
    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }
}
