pub mod chats;
pub mod course_plans;
pub mod documents;
pub mod health;
pub mod models;
pub mod profile;

use serde::Serialize;
use utoipa::ToSchema;

/// Body of mutating endpoints that return no resource
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
