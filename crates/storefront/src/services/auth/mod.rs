//! Authentication service.
//!
//! Accounts live in a hosted auth service. A client exchanges its access
//! token for a server session: the token is introspected once, the local
//! profile is upserted, and the resulting [`CurrentUser`] is what every later
//! request sees.

mod error;

pub use error::AuthError;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use cemento_core::{Email, UserId};

use crate::config::AuthConfig;
use crate::db::Store;
use crate::models::CurrentUser;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// User as reported by the hosted auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
}

/// Hosted auth service client.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    user_url: Url,
}

impl AuthClient {
    /// Create a new auth client.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.anon_key.expose_secret())
                .map_err(|e| AuthError::Parse(format!("Invalid anon key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let user_url = config
            .url
            .join("auth/v1/user")
            .map_err(|e| AuthError::Parse(format!("Invalid auth URL: {e}")))?;

        Ok(Self { client, user_url })
    }

    /// Resolve an access token to the user it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the service rejects the token.
    #[instrument(skip_all)]
    pub async fn user_for_token(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(self.user_url.clone())
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();

        if matches!(
            status,
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
        ) {
            return Err(AuthError::InvalidToken);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))
    }
}

/// Signs users in against the hosted auth service and the local profile table.
pub struct AuthService<'a> {
    client: &'a AuthClient,
    store: &'a dyn Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(client: &'a AuthClient, store: &'a dyn Store) -> Self {
        Self { client, store }
    }

    /// Exchange an access token for the session identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for rejected or empty tokens and
    /// `AuthError::InvalidEmail` when the auth user has no valid email.
    #[instrument(skip_all)]
    pub async fn sign_in(&self, access_token: &str) -> Result<CurrentUser, AuthError> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let user = self.client.user_for_token(access_token).await?;
        let email = Email::parse(user.email.as_deref().unwrap_or_default())?;
        let profile = self.store.upsert_profile(user.id, &email).await?;

        tracing::info!(user_id = %profile.user_id, role = %profile.role, "User signed in");

        Ok(CurrentUser {
            id: profile.user_id,
            email: profile.email,
            role: profile.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use cemento_core::UserRole;

    use super::*;
    use crate::db::MemoryStore;

    fn client_for(server: &MockServer) -> AuthClient {
        AuthClient::new(&AuthConfig {
            url: Url::parse(&server.uri()).unwrap(),
            anon_key: SecretString::from("anon-Qx7vK2pLm9"),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_upserts_customer_profile() {
        let server = MockServer::start().await;
        let user_id = UserId::generate();
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer good-token"))
            .and(header("apikey", "anon-Qx7vK2pLm9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": user_id.to_string(),
                "email": "Site.Engineer@Builders.in",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let store = MemoryStore::new();
        let user = AuthService::new(&client, &store)
            .sign_in("good-token")
            .await
            .unwrap();

        assert_eq!(user.id, user_id);
        assert_eq!(user.email.as_str(), "site.engineer@builders.in");
        assert_eq!(user.role, UserRole::Customer);
    }

    #[tokio::test]
    async fn test_rejected_token_is_invalid_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let store = MemoryStore::new();
        let err = AuthService::new(&client, &store)
            .sign_in("expired")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidToken));
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_blank_token_never_reaches_service() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        let store = MemoryStore::new();
        let err = AuthService::new(&client, &store)
            .sign_in("   ")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
