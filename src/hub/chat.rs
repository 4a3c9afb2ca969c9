//! Chat completion endpoint

use super::common::{self, ApiError, ApiResult};
use super::AppState;
use crate::route::{ChatRequest, ChatResponse};
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};

/// POST /chat/completions - Route a chat request to a backend
///
/// Malformed bodies (invalid JSON, unknown priority values, wrong types)
/// surface as 400 rather than axum's default rejection codes.
pub async fn chat_completions(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    match state.router.route(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => Err(common::from_error(err)),
    }
}
