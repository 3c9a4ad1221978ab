use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use amigo_persist::{DBDocument, DBSuggestion};

use crate::{
    auth::AuthSession,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct DocumentQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct SuggestionsQuery {
    pub document_id: Option<String>,
}

/// All versions of a document, oldest first
#[utoipa::path(
    get,
    path = "/api/document",
    params(DocumentQuery),
    responses(
        (status = 200, description = "Document versions"),
        (status = 400, description = "Missing id"),
        (status = 401, description = "Not signed in or not the owner"),
        (status = 404, description = "Unknown document")
    ),
    tag = "documents"
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Query(query): Query<DocumentQuery>,
) -> ApiResult<Json<Vec<DBDocument>>> {
    let id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Missing id".to_string()))?;

    let versions = state.persist.get_document_versions(&id).await?;
    let first = versions.first().ok_or(ApiError::NotFound("Document"))?;
    if first.user_id != session.user_id() {
        return Err(ApiError::Unauthorized);
    }

    Ok(Json(versions))
}

/// Suggestions made for a document
#[utoipa::path(
    get,
    path = "/api/suggestions",
    params(SuggestionsQuery),
    responses(
        (status = 200, description = "Suggestions for the document"),
        (status = 400, description = "Missing documentId"),
        (status = 401, description = "Not signed in or not the owner")
    ),
    tag = "documents"
)]
pub async fn get_suggestions(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Query(query): Query<SuggestionsQuery>,
) -> ApiResult<Json<Vec<DBSuggestion>>> {
    let document_id = query
        .document_id
        .ok_or_else(|| ApiError::BadRequest("Missing documentId".to_string()))?;

    let suggestions = state.persist.get_suggestions(&document_id).await?;
    if suggestions.iter().any(|s| s.user_id != session.user_id()) {
        return Err(ApiError::Unauthorized);
    }

    Ok(Json(suggestions))
}
