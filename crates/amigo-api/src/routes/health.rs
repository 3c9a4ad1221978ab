use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Returns the health status of the API and its dependencies
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut services = HashMap::new();

    let storage = match state.persist.list_chats("_health_check").await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            "disconnected"
        }
    };
    services.insert("storage".to_string(), storage.to_string());

    for model in &state.catalog.models {
        let status = if state.runtime(model.provider).is_some() {
            "available"
        } else {
            "unconfigured"
        };
        services.insert(format!("model:{}", model.id), status.to_string());
    }

    let status = if storage == "connected" { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
