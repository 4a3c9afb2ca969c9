//! Routing analytics endpoint

use super::AppState;
use crate::metrics::{self, AnalyticsSnapshot};
use axum::{extract::State, Json};

/// GET /routing/analytics - Global and per-provider metrics
pub async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsSnapshot> {
    let snapshot = metrics::snapshot(state.router.specs(), state.router.store());
    Json(snapshot)
}
