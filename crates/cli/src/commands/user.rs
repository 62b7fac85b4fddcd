//! User role management.
//!
//! Accounts are created by the hosted auth service; a profile row appears on
//! first sign-in. Promotion only changes the local role.

use cemento_core::{Email, UserRole};
use cemento_storefront::db::ProfileRepository;

use super::{CliError, store};

/// Set the role of the profile with this email.
///
/// Existing sessions keep the old role until the user signs in again.
///
/// # Errors
///
/// Returns `CliError::InvalidEmail` for a malformed email and
/// `CliError::UnknownUser` if no profile has that email.
pub async fn promote(email: &str, role: UserRole) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;
    let store = store().await?;

    let profile = store
        .set_profile_role(&email, role)
        .await?
        .ok_or_else(|| CliError::UnknownUser(email.to_string()))?;

    tracing::info!(
        user_id = %profile.user_id,
        email = %profile.email,
        role = %profile.role,
        "Profile role updated"
    );
    Ok(())
}
