//! Daily business summary for staff.

use axum::{Json, extract::State};
use chrono::Utc;

use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::services::KpiEngine;
use crate::services::kpi::DailySummary;
use crate::state::AppState;

/// Summary of yesterday (UTC).
pub async fn daily_summary(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<DailySummary>> {
    let summary = KpiEngine::new(state.store())
        .daily_summary(Utc::now())
        .await?;
    Ok(Json(summary))
}
