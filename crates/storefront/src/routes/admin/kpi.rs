//! Dashboard KPI endpoint.

use axum::{Json, extract::State};
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::services::KpiEngine;
use crate::services::kpi::KpiSnapshot;
use crate::state::AppState;

/// KPI snapshot as of now. Failure details are only exposed outside production.
pub async fn metrics(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<KpiSnapshot>> {
    let snapshot = KpiEngine::new(state.store())
        .snapshot(Utc::now())
        .await
        .map_err(|source| AppError::Metrics {
            details: (!state.config().is_production()).then(|| source.to_string()),
            source,
        })?;
    Ok(Json(snapshot))
}
