use utoipa::OpenApi;

use crate::handlers::stream;
use crate::routes::{chats, course_plans, documents, health, models, profile, StatusResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        models::list_models,
        stream::send_chat_stream,
        chats::delete_chat,
        chats::list_history,
        chats::update_visibility,
        course_plans::list_course_plans,
        course_plans::update_topic,
        profile::get_profile,
        documents::get_document,
        documents::get_suggestions,
    ),
    components(schemas(
        health::HealthResponse,
        stream::SendChatRequest,
        stream::ChatMessageInput,
        stream::ToolInvocationInput,
        chats::UpdateVisibilityRequest,
        course_plans::UpdateTopicRequest,
        profile::ProfileResponse,
        profile::UserProfileEnvelope,
        course_plans::CoursePlansResponse,
        StatusResponse,
    )),
    tags(
        (name = "chat", description = "Chat turns and chat management"),
        (name = "course-plans", description = "Saved course plans"),
        (name = "profile", description = "Learner profile"),
        (name = "documents", description = "Artifacts and suggestions"),
        (name = "models", description = "Model catalog"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;
