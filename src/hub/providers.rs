//! Provider status and manual failure simulation endpoints

use super::common::{ApiError, ApiResult};
use super::AppState;
use crate::classify::PromptKind;
use crate::metrics::{self, ProviderReport};
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Static spec fields plus the live report for one provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub model: String,
    pub cost_per_token: f64,
    pub latency_ms: u64,
    pub rate_limit_rpm: u32,
    pub specialties: Vec<PromptKind>,
    pub quality_score: f64,
    #[serde(flatten)]
    pub report: ProviderReport,
}

/// GET /providers - Status of every configured provider
pub async fn get_providers(State(state): State<AppState>) -> Json<Vec<ProviderStatus>> {
    let store = state.router.store();
    let statuses = state
        .router
        .specs()
        .iter()
        .map(|spec| ProviderStatus {
            name: spec.name.clone(),
            model: spec.model.clone(),
            cost_per_token: spec.cost_per_token,
            latency_ms: spec.latency_ms,
            rate_limit_rpm: spec.rate_limit_rpm,
            specialties: spec.specialties.clone(),
            quality_score: spec.quality_score,
            report: metrics::provider_report(spec, store),
        })
        .collect();
    Json(statuses)
}

/// Body for POST /simulate/failure
#[derive(Debug, Deserialize)]
pub struct SimulateFailureRequest {
    pub provider: String,
    pub down: bool,
}

/// POST /simulate/failure - Flip a provider's manual-down flag
pub async fn simulate_failure(
    State(state): State<AppState>,
    payload: Result<Json<SimulateFailureRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let known = state
        .router
        .specs()
        .iter()
        .any(|spec| spec.name == body.provider);
    if !known {
        return Err(ApiError::not_found(format!(
            "Unknown provider: {}",
            body.provider
        )));
    }

    state.router.store().set_manual_down(&body.provider, body.down);
    info!(provider = %body.provider, down = body.down, "manual down flag updated");

    Ok(Json(json!({
        "provider": body.provider,
        "down": body.down,
    })))
}
