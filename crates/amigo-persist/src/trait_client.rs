use amigo_types::{CourseModule, CoursePlanContent};
use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    DBChat, DBCoursePlan, DBDocument, DBMessage, DBSuggestion, DBUserProfile, Visibility,
};

/// Trait for database persistence operations
///
/// Implementations provide database-specific CRUD operations
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Create a chat; saving an existing id is a no-op
    async fn save_chat(&self, chat: DBChat) -> Result<()>;

    async fn get_chat(&self, chat_id: &str) -> Result<Option<DBChat>>;

    /// Chats of a user, newest first
    async fn list_chats(&self, user_id: &str) -> Result<Vec<DBChat>>;

    async fn update_chat_visibility(&self, chat_id: &str, visibility: Visibility) -> Result<()>;

    /// Delete a chat together with its messages
    async fn delete_chat(&self, chat_id: &str) -> Result<()>;

    async fn save_messages(&self, messages: Vec<DBMessage>) -> Result<()>;

    /// Messages of a chat in creation order
    async fn get_messages(&self, chat_id: &str) -> Result<Vec<DBMessage>>;

    /// Append a new version of a document
    async fn save_document(&self, document: DBDocument) -> Result<()>;

    /// Latest version of a document
    async fn get_document(&self, document_id: &str) -> Result<Option<DBDocument>>;

    /// Every version of a document, oldest first
    async fn get_document_versions(&self, document_id: &str) -> Result<Vec<DBDocument>>;

    async fn save_suggestions(&self, suggestions: Vec<DBSuggestion>) -> Result<()>;

    async fn get_suggestions(&self, document_id: &str) -> Result<Vec<DBSuggestion>>;

    /// Insert or replace the profile of `profile.user_id`
    async fn upsert_profile(&self, profile: DBUserProfile) -> Result<()>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<DBUserProfile>>;

    /// Overwrite the user's most recently updated plan, or insert the first one
    async fn save_course_plan(
        &self,
        user_id: &str,
        plan: CoursePlanContent,
    ) -> Result<DBCoursePlan>;

    /// Plans of a user, most recently updated first
    async fn list_course_plans(&self, user_id: &str) -> Result<Vec<DBCoursePlan>>;

    async fn get_course_plan(&self, plan_id: &str) -> Result<Option<DBCoursePlan>>;

    /// Replace the module list of a plan and bump `updated_at`
    async fn update_course_plan_modules(
        &self,
        plan_id: &str,
        modules: Vec<CourseModule>,
    ) -> Result<DBCoursePlan>;
}
