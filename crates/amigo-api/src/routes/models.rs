use axum::{extract::State, Json};
use std::sync::Arc;

use amigo_types::ModelCatalog;

use crate::state::AppState;

/// Models a client may pick from
#[utoipa::path(
    get,
    path = "/api/models",
    responses((status = 200, description = "Model catalog with the default model id")),
    tag = "models"
)]
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelCatalog> {
    Json(state.catalog.clone())
}
