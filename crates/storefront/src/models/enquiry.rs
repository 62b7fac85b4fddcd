//! Customer enquiries submitted through the contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cemento_core::{Email, EnquiryId, EnquiryStatus, UserId};

/// An enquiry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Enquiry {
    pub id: EnquiryId,
    /// Set when the enquiry was submitted by a signed-in user.
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
    pub status: EnquiryStatus,
    pub reply: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for inserting an enquiry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEnquiry {
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}
