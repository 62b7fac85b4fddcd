//! Enquiry repository.

use chrono::{DateTime, Utc};

use cemento_core::{EnquiryId, EnquiryStatus};

use super::{PgStore, RepositoryError};
use crate::models::{Enquiry, NewEnquiry};

const ENQUIRY_COLUMNS: &str =
    "id, user_id, name, email, subject, message, status, reply, replied_at, created_at";

/// Enquiry persistence operations.
#[async_trait::async_trait]
pub trait EnquiryRepository: Send + Sync {
    /// Insert an open enquiry.
    async fn create_enquiry(&self, enquiry: NewEnquiry) -> Result<Enquiry, RepositoryError>;

    /// Enquiries newest first, optionally filtered by status.
    async fn list_enquiries(
        &self,
        status: Option<EnquiryStatus>,
    ) -> Result<Vec<Enquiry>, RepositoryError>;

    /// Record a staff reply and mark the enquiry replied.
    async fn reply_to_enquiry(
        &self,
        id: EnquiryId,
        reply: &str,
        replied_at: DateTime<Utc>,
    ) -> Result<Option<Enquiry>, RepositoryError>;

    /// Number of enquiries still open.
    async fn open_enquiry_count(&self) -> Result<i64, RepositoryError>;
}

#[async_trait::async_trait]
impl EnquiryRepository for PgStore {
    async fn create_enquiry(&self, new: NewEnquiry) -> Result<Enquiry, RepositoryError> {
        let enquiry = sqlx::query_as::<_, Enquiry>(&format!(
            "INSERT INTO shop.enquiries (user_id, name, email, subject, message) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ENQUIRY_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.subject)
        .bind(&new.message)
        .fetch_one(self.pool())
        .await?;
        Ok(enquiry)
    }

    async fn list_enquiries(
        &self,
        status: Option<EnquiryStatus>,
    ) -> Result<Vec<Enquiry>, RepositoryError> {
        let rows = sqlx::query_as::<_, Enquiry>(&format!(
            "SELECT {ENQUIRY_COLUMNS} FROM shop.enquiries \
             WHERE ($1::shop.enquiry_status IS NULL OR status = $1) \
             ORDER BY created_at DESC"
        ))
        .bind(status)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn reply_to_enquiry(
        &self,
        id: EnquiryId,
        reply: &str,
        replied_at: DateTime<Utc>,
    ) -> Result<Option<Enquiry>, RepositoryError> {
        let enquiry = sqlx::query_as::<_, Enquiry>(&format!(
            "UPDATE shop.enquiries SET reply = $2, status = 'replied', replied_at = $3 \
             WHERE id = $1 \
             RETURNING {ENQUIRY_COLUMNS}"
        ))
        .bind(id)
        .bind(reply)
        .bind(replied_at)
        .fetch_optional(self.pool())
        .await?;
        Ok(enquiry)
    }

    async fn open_enquiry_count(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shop.enquiries WHERE status = 'open'")
                .fetch_one(self.pool())
                .await?;
        Ok(count)
    }
}
