use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use amigo_persist::DBCoursePlan;
use amigo_types::set_topic_completed;

use super::StatusResponse;
use crate::{
    auth::AuthSession,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicRequest {
    /// Course plan id
    pub id: String,
    pub module_id: String,
    pub topic_id: String,
    pub completed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoursePlansResponse {
    #[schema(value_type = Vec<Object>)]
    pub course_plans: Vec<DBCoursePlan>,
}

/// Course plans of the signed-in user, newest first
#[utoipa::path(
    get,
    path = "/api/course-plans",
    responses(
        (status = 200, description = "Course plans of the caller", body = CoursePlansResponse),
        (status = 401, description = "Not signed in")
    ),
    tag = "course-plans"
)]
pub async fn list_course_plans(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> ApiResult<Json<CoursePlansResponse>> {
    let course_plans = state.persist.list_course_plans(session.user_id()).await?;
    Ok(Json(CoursePlansResponse { course_plans }))
}

/// Mark a topic of a course plan completed or not
///
/// Unknown module or topic ids leave the plan as it was.
#[utoipa::path(
    put,
    path = "/api/course-plans",
    request_body = UpdateTopicRequest,
    responses(
        (status = 200, description = "Course plan updated", body = StatusResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Plan belongs to another user"),
        (status = 404, description = "Unknown plan")
    ),
    tag = "course-plans"
)]
pub async fn update_topic(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Json(req): Json<UpdateTopicRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let plan = state
        .persist
        .get_course_plan(&req.id)
        .await?
        .ok_or(ApiError::NotFound("Course plan"))?;
    if plan.user_id != session.user_id() {
        return Err(ApiError::Forbidden);
    }

    let mut modules = plan.plan.modules;
    let changed = set_topic_completed(&mut modules, &req.module_id, &req.topic_id, req.completed);
    if !changed {
        tracing::debug!(plan_id = %req.id, module_id = %req.module_id, topic_id = %req.topic_id, "No matching topic");
    }

    state
        .persist
        .update_course_plan_modules(&req.id, modules)
        .await?;

    Ok(Json(StatusResponse::ok("Course progress updated successfully")))
}
