#[cfg(feature = "mongodb")]
use mongodb::Client;
#[cfg(feature = "mongodb")]
use async_trait::async_trait;

#[cfg(feature = "mongodb")]
use amigo_types::{CourseModule, CoursePlanContent};

#[cfg(feature = "mongodb")]
use crate::trait_client::PersistenceClient;
#[cfg(feature = "mongodb")]
use crate::models::{
    DBChat, DBCoursePlan, DBDocument, DBMessage, DBSuggestion, DBUserProfile, Visibility,
};
#[cfg(feature = "mongodb")]
use crate::dbs::mongo::repositories::{
    MongoChatRepository, MongoCoursePlanRepository, MongoDocumentRepository,
    MongoMessageRepository, MongoProfileRepository, MongoSuggestionRepository,
};
#[cfg(feature = "mongodb")]
use crate::error::{Result, PersistError};

#[cfg(feature = "mongodb")]
pub struct MongoPersistenceClient {
    chat_repo: MongoChatRepository,
    message_repo: MongoMessageRepository,
    document_repo: MongoDocumentRepository,
    suggestion_repo: MongoSuggestionRepository,
    profile_repo: MongoProfileRepository,
    course_plan_repo: MongoCoursePlanRepository,
}

#[cfg(feature = "mongodb")]
impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::info!(database = %database, "Connected to MongoDB");

        Ok(Self {
            chat_repo: MongoChatRepository::new(&client, database),
            message_repo: MongoMessageRepository::new(&client, database),
            document_repo: MongoDocumentRepository::new(&client, database),
            suggestion_repo: MongoSuggestionRepository::new(&client, database),
            profile_repo: MongoProfileRepository::new(&client, database),
            course_plan_repo: MongoCoursePlanRepository::new(&client, database),
        })
    }
}

#[cfg(feature = "mongodb")]
#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn save_chat(&self, chat: DBChat) -> Result<()> {
        self.chat_repo.save_chat(chat.into()).await
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<DBChat>> {
        Ok(self.chat_repo.get_chat(chat_id).await?.map(Into::into))
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<DBChat>> {
        let chats = self.chat_repo.list_chats(user_id).await?;
        Ok(chats.into_iter().map(Into::into).collect())
    }

    async fn update_chat_visibility(&self, chat_id: &str, visibility: Visibility) -> Result<()> {
        if self.chat_repo.update_visibility(chat_id, visibility).await? == 0 {
            return Err(PersistError::not_found("chat", chat_id));
        }
        Ok(())
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<()> {
        let deleted = self.message_repo.delete_for_chat(chat_id).await?;
        self.chat_repo.delete_chat(chat_id).await?;
        tracing::debug!(chat_id = %chat_id, messages = deleted, "Deleted chat");
        Ok(())
    }

    async fn save_messages(&self, messages: Vec<DBMessage>) -> Result<()> {
        let messages = messages.into_iter().map(Into::into).collect();
        self.message_repo.save_messages(messages).await
    }

    async fn get_messages(&self, chat_id: &str) -> Result<Vec<DBMessage>> {
        let messages = self.message_repo.get_messages(chat_id).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn save_document(&self, document: DBDocument) -> Result<()> {
        self.document_repo.save_version(document.into()).await
    }

    async fn get_document(&self, document_id: &str) -> Result<Option<DBDocument>> {
        Ok(self.document_repo.get_latest(document_id).await?.map(Into::into))
    }

    async fn get_document_versions(&self, document_id: &str) -> Result<Vec<DBDocument>> {
        let versions = self.document_repo.get_versions(document_id).await?;
        Ok(versions.into_iter().map(Into::into).collect())
    }

    async fn save_suggestions(&self, suggestions: Vec<DBSuggestion>) -> Result<()> {
        let suggestions = suggestions.into_iter().map(Into::into).collect();
        self.suggestion_repo.save_suggestions(suggestions).await
    }

    async fn get_suggestions(&self, document_id: &str) -> Result<Vec<DBSuggestion>> {
        let suggestions = self.suggestion_repo.get_suggestions(document_id).await?;
        Ok(suggestions.into_iter().map(Into::into).collect())
    }

    async fn upsert_profile(&self, profile: DBUserProfile) -> Result<()> {
        self.profile_repo.upsert(profile.into()).await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<DBUserProfile>> {
        Ok(self.profile_repo.get(user_id).await?.map(Into::into))
    }

    async fn save_course_plan(
        &self,
        user_id: &str,
        plan: CoursePlanContent,
    ) -> Result<DBCoursePlan> {
        Ok(self.course_plan_repo.save(user_id, plan).await?.into())
    }

    async fn list_course_plans(&self, user_id: &str) -> Result<Vec<DBCoursePlan>> {
        let plans = self.course_plan_repo.list_for_user(user_id).await?;
        Ok(plans.into_iter().map(Into::into).collect())
    }

    async fn get_course_plan(&self, plan_id: &str) -> Result<Option<DBCoursePlan>> {
        Ok(self.course_plan_repo.get(plan_id).await?.map(Into::into))
    }

    async fn update_course_plan_modules(
        &self,
        plan_id: &str,
        modules: Vec<CourseModule>,
    ) -> Result<DBCoursePlan> {
        Ok(self.course_plan_repo.update_modules(plan_id, modules).await?.into())
    }
}
