//! Payment processor client.
//!
//! Talks to a Stripe-compatible REST API: form-encoded requests, HTTP basic
//! auth with the secret key, JSON responses. Only payment intents are used.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::PaymentConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from the payment processor.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Processor returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// No payment intent with this id.
    #[error("payment intent not found: {0}")]
    NotFound(String),

    /// Failed to build the request or parse the response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A payment intent as returned by the processor.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Processor status string (`succeeded`, `requires_payment_method`, ...).
    pub status: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Amount captured so far, in minor units.
    #[serde(default)]
    pub amount_received: i64,
    pub currency: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Payment processor client.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    api_base: Url,
    secret_key: SecretString,
    currency: String,
}

impl std::fmt::Debug for PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentClient")
            .field("api_base", &self.api_base.as_str())
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl PaymentClient {
    /// Create a new payment client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
        })
    }

    /// Currency used for new intents.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Create a payment intent for `amount` minor units.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the processor rejects it.
    #[instrument(skip(self, metadata))]
    pub async fn create_intent(
        &self,
        amount: i64,
        metadata: &[(&str, &str)],
    ) -> Result<PaymentIntent, PaymentError> {
        let url = self.endpoint("v1/payment_intents")?;

        let mut params: Vec<(String, String)> = vec![
            ("amount".to_owned(), amount.to_string()),
            ("currency".to_owned(), self.currency.clone()),
            (
                "automatic_payment_methods[enabled]".to_owned(),
                "true".to_owned(),
            ),
        ];
        for (key, value) in metadata {
            params.push((format!("metadata[{key}]"), (*value).to_owned()));
        }

        let response = self
            .client
            .post(url)
            .basic_auth(self.secret_key.expose_secret(), Some(""))
            .form(&params)
            .send()
            .await?;

        Self::parse_intent(response, None).await
    }

    /// Retrieve a payment intent by id.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotFound` if the processor has no such intent.
    #[instrument(skip(self))]
    pub async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        // Processor ids are `pi_` followed by alphanumerics; anything else
        // cannot exist and must not reach the URL path.
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(PaymentError::NotFound(id.to_owned()));
        }

        let url = self.endpoint(&format!("v1/payment_intents/{id}"))?;
        let response = self
            .client
            .get(url)
            .basic_auth(self.secret_key.expose_secret(), Some(""))
            .send()
            .await?;

        Self::parse_intent(response, Some(id)).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentError> {
        self.api_base
            .join(path)
            .map_err(|e| PaymentError::Parse(format!("invalid endpoint {path}: {e}")))
    }

    async fn parse_intent(
        response: reqwest::Response,
        id: Option<&str>,
    ) -> Result<PaymentIntent, PaymentError> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(PaymentError::NotFound(id.to_owned()));
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }
}
