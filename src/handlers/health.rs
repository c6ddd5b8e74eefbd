use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::types::{AppState, NfProfile};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub nf_instance_id: String,
    pub nrf_configured: bool,
}

pub async fn status(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    (
        StatusCode::OK,
        Json(StatusResponse {
            service: state.service_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            nf_instance_id: state.profile.nf_instance_id.clone(),
            nrf_configured: state.nrf_client.is_some(),
        }),
    )
}

/// The profile this NF registers with the NRF.
pub async fn profile(State(state): State<AppState>) -> Json<NfProfile> {
    Json(state.profile.as_ref().clone())
}
