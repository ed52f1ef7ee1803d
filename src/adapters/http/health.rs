//! Health endpoint.
//!
//! Reports which side of each capability the selection factories picked, so
//! an operator can see at a glance whether the process is talking to live
//! vendors or running on stubs.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::providers::ProviderModes;

/// State for the health route.
#[derive(Clone)]
pub struct HealthAppState {
    pub provider_modes: ProviderModes,
}

/// Health response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub providers: ProviderModes,
}

/// `GET /health`
pub async fn health(State(state): State<HealthAppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        providers: state.provider_modes,
    })
}
