use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use amigo_persist::DBUserProfile;
use amigo_types::avatar_fallback;

use crate::{
    auth::AuthSession,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Profile as the dashboard renders it; absent fields are empty strings
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub name: String,
    pub education: String,
    pub past_experience: String,
    pub learning_goals: String,
    pub current_goal: String,
    pub daily_time_commitment: String,
    pub prior_knowledge: String,
    pub avatar_fallback: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileEnvelope {
    pub user_profile: ProfileResponse,
}

impl From<DBUserProfile> for ProfileResponse {
    fn from(profile: DBUserProfile) -> Self {
        let avatar = profile
            .avatar_fallback
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| avatar_fallback(&profile.name));
        Self {
            name: profile.name,
            education: profile.education.unwrap_or_default(),
            past_experience: profile.past_experience.unwrap_or_default(),
            learning_goals: profile.learning_goals.unwrap_or_default(),
            current_goal: profile.current_goal.unwrap_or_default(),
            daily_time_commitment: profile.daily_time_commitment.unwrap_or_default(),
            prior_knowledge: profile.prior_knowledge.unwrap_or_default(),
            avatar_fallback: avatar,
            updated_at: profile.updated_at,
        }
    }
}

/// Profile of the signed-in user
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile of the caller", body = UserProfileEnvelope),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No profile yet")
    ),
    tag = "profile"
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> ApiResult<Json<UserProfileEnvelope>> {
    let profile = state
        .persist
        .get_profile(session.user_id())
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;

    Ok(Json(UserProfileEnvelope {
        user_profile: profile.into(),
    }))
}
