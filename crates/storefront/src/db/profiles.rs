//! Profile repository: local roles for hosted-auth users.

use chrono::Utc;

use cemento_core::{Email, UserId, UserRole};

use super::{PgStore, RepositoryError};
use crate::models::Profile;

const PROFILE_COLUMNS: &str = "user_id, email, role, created_at, updated_at";

/// Profile persistence operations.
#[async_trait::async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create the profile on first sign-in, or refresh its email. The role is kept.
    async fn upsert_profile(&self, user_id: UserId, email: &Email)
    -> Result<Profile, RepositoryError>;

    /// Set the role of the profile with this email.
    async fn set_profile_role(
        &self,
        email: &Email,
        role: UserRole,
    ) -> Result<Option<Profile>, RepositoryError>;
}

#[async_trait::async_trait]
impl ProfileRepository for PgStore {
    async fn upsert_profile(
        &self,
        user_id: UserId,
        email: &Email,
    ) -> Result<Profile, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "INSERT INTO shop.profiles (user_id, email) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET email = EXCLUDED.email, updated_at = $3 \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(email)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_insert(e, "profile with this email"))?;
        Ok(profile)
    }

    async fn set_profile_role(
        &self,
        email: &Email,
        role: UserRole,
    ) -> Result<Option<Profile>, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "UPDATE shop.profiles SET role = $2, updated_at = $3 WHERE email = $1 \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(email)
        .bind(role)
        .bind(Utc::now())
        .fetch_optional(self.pool())
        .await?;
        Ok(profile)
    }
}
