use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use amigo_persist::{DBChat, Visibility};

use super::StatusResponse;
use crate::{
    auth::AuthSession,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ChatIdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisibilityRequest {
    pub chat_id: String,
    /// `private` or `public`
    #[schema(value_type = String)]
    pub visibility: Visibility,
}

/// Delete a chat and its messages
#[utoipa::path(
    delete,
    path = "/api/chat",
    params(ChatIdQuery),
    responses(
        (status = 200, description = "Chat deleted", body = StatusResponse),
        (status = 401, description = "Not signed in or not the owner"),
        (status = 404, description = "Missing id or unknown chat"),
        (status = 500, description = "Storage failure")
    ),
    tag = "chat"
)]
pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    session: Option<AuthSession>,
    Query(query): Query<ChatIdQuery>,
) -> ApiResult<Json<StatusResponse>> {
    // A missing id is rejected before the session is looked at
    let id = query.id.ok_or(ApiError::NotFound("Chat"))?;
    let session = session.ok_or(ApiError::Unauthorized)?;

    let chat = state
        .persist
        .get_chat(&id)
        .await?
        .ok_or(ApiError::NotFound("Chat"))?;
    if !chat.is_owned_by(session.user_id()) {
        return Err(ApiError::Unauthorized);
    }

    state.persist.delete_chat(&id).await?;
    tracing::info!(chat_id = %id, "Chat deleted");

    Ok(Json(StatusResponse::ok("Chat deleted")))
}

/// Chats of the signed-in user, newest first
#[utoipa::path(
    get,
    path = "/api/history",
    responses(
        (status = 200, description = "Chats of the caller"),
        (status = 401, description = "Not signed in")
    ),
    tag = "chat"
)]
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> ApiResult<Json<Vec<DBChat>>> {
    Ok(Json(state.persist.list_chats(session.user_id()).await?))
}

/// Make a chat private or public
#[utoipa::path(
    patch,
    path = "/api/chat/visibility",
    request_body = UpdateVisibilityRequest,
    responses(
        (status = 200, description = "Visibility updated", body = StatusResponse),
        (status = 401, description = "Not signed in or not the owner"),
        (status = 404, description = "Unknown chat")
    ),
    tag = "chat"
)]
pub async fn update_visibility(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Json(req): Json<UpdateVisibilityRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let chat = state
        .persist
        .get_chat(&req.chat_id)
        .await?
        .ok_or(ApiError::NotFound("Chat"))?;
    if !chat.is_owned_by(session.user_id()) {
        return Err(ApiError::Unauthorized);
    }

    state
        .persist
        .update_chat_visibility(&req.chat_id, req.visibility)
        .await?;

    Ok(Json(StatusResponse::ok("Visibility updated")))
}
