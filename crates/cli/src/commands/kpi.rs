//! KPI snapshot report.

use chrono::Utc;

use cemento_storefront::services::KpiEngine;

use super::{CliError, store};

/// Compute the dashboard snapshot and print it as pretty JSON.
///
/// # Errors
///
/// Returns `CliError` if the store cannot be read.
pub async fn print_snapshot() -> Result<(), CliError> {
    let store = store().await?;
    let snapshot = KpiEngine::new(&store).snapshot(Utc::now()).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}
