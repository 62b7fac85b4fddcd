//! Staff replies to customer enquiries.

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use cemento_core::{EnquiryId, EnquiryStatus, NotificationType};

use super::notifications::NotificationService;
use crate::db::{RepositoryError, Store};
use crate::models::{Enquiry, NewNotification};

/// Outcome of a reply: the updated enquiry and whether the customer was told.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyOutcome {
    pub enquiry: Enquiry,
    pub notified: bool,
}

/// Enquiry operations for staff.
pub struct EnquiryService<'a> {
    store: &'a dyn Store,
}

impl<'a> EnquiryService<'a> {
    /// Create a new enquiry service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Enquiries newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list(&self, status: Option<EnquiryStatus>) -> Result<Vec<Enquiry>, RepositoryError> {
        self.store.list_enquiries(status).await
    }

    /// Store the reply, then notify the enquiring user if there is one.
    ///
    /// The notification runs after the reply is saved and never fails the call.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the enquiry does not exist.
    #[instrument(skip(self, reply))]
    pub async fn reply(&self, id: EnquiryId, reply: &str) -> Result<ReplyOutcome, RepositoryError> {
        let enquiry = self
            .store
            .reply_to_enquiry(id, reply, Utc::now())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let notified = match enquiry.user_id {
            Some(user_id) => {
                NotificationService::new(self.store)
                    .create(NewNotification {
                        user_id,
                        title: "Reply to your enquiry".to_owned(),
                        message: format!("We have replied to your enquiry: {}", enquiry.subject),
                        kind: NotificationType::System,
                        order_id: None,
                    })
                    .await
            }
            None => false,
        };

        Ok(ReplyOutcome { enquiry, notified })
    }
}
