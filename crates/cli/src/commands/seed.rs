//! Seed the storefront with demo catalog data.
//!
//! Products are spread over the last ~90 days so both KPI windows have data,
//! and a few sit under the low-stock threshold. Re-running inserts duplicates;
//! seed a fresh database.

use chrono::{Duration, Utc};
use tracing::info;

use cemento_core::{Email, ProductStatus};
use cemento_storefront::db::{CatalogRepository, EnquiryRepository};
use cemento_storefront::models::{NewEnquiry, NewProduct};

use super::{CliError, store};

/// (name, status, active, stock, age in days)
const PRODUCTS: &[(&str, ProductStatus, bool, i32, i64)] = &[
    ("OPC 53 Grade Cement (50kg)", ProductStatus::Published, true, 840, 75),
    ("OPC 43 Grade Cement (50kg)", ProductStatus::Published, true, 620, 70),
    ("PPC Fly Ash Cement (50kg)", ProductStatus::Published, true, 45, 40),
    ("PSC Slag Cement (50kg)", ProductStatus::Published, true, 12, 20),
    ("White Cement (5kg)", ProductStatus::Published, true, 80, 12),
    ("Rapid Hardening Cement (50kg)", ProductStatus::Published, true, 300, 5),
    ("Ready Mix Plaster (40kg)", ProductStatus::Draft, true, 0, 3),
    ("Sulphate Resisting Cement (50kg)", ProductStatus::Archived, false, 25, 120),
];

/// (name, email, subject, message)
const ENQUIRIES: &[(&str, &str, &str, &str)] = &[
    (
        "Ravi Kumar",
        "ravi.kumar@example.in",
        "Bulk pricing for 500 bags",
        "We are building a warehouse and need 500 bags of OPC 53 delivered to Pune.",
    ),
    (
        "Anita Desai",
        "anita.desai@example.in",
        "Delivery slot change",
        "Can my delivery be moved to Saturday morning?",
    ),
];

/// Insert demo products and enquiries.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or an insert fails.
pub async fn demo_data() -> Result<(), CliError> {
    let store = store().await?;
    let now = Utc::now();

    for &(name, status, is_active, stock_quantity, age_days) in PRODUCTS {
        let product = store
            .create_product(NewProduct {
                name: name.to_string(),
                status,
                is_active,
                stock_quantity,
                created_at: Some(now - Duration::days(age_days)),
            })
            .await?;
        info!(id = %product.id, name = %product.name, "Product created");
    }

    for &(name, email, subject, message) in ENQUIRIES {
        let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;
        let enquiry = store
            .create_enquiry(NewEnquiry {
                user_id: None,
                name: name.to_string(),
                email,
                subject: subject.to_string(),
                message: message.to_string(),
            })
            .await?;
        info!(id = %enquiry.id, subject = %enquiry.subject, "Enquiry created");
    }

    info!(
        products = PRODUCTS.len(),
        enquiries = ENQUIRIES.len(),
        "Seeding complete!"
    );
    Ok(())
}
