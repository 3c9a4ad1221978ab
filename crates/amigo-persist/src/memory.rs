use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use amigo_types::{CourseModule, CoursePlanContent};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{
    DBChat, DBCoursePlan, DBDocument, DBMessage, DBSuggestion, DBUserProfile, Visibility,
};
use crate::trait_client::PersistenceClient;

#[derive(Default)]
struct Tables {
    chats: HashMap<String, DBChat>,
    messages: Vec<DBMessage>,
    documents: Vec<DBDocument>,
    suggestions: Vec<DBSuggestion>,
    profiles: HashMap<String, DBUserProfile>,
    course_plans: Vec<DBCoursePlan>,
}

/// Process-local store used in development and tests
#[derive(Default)]
pub struct InMemoryPersistenceClient {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with a connection error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PersistError::Connection("store unavailable".to_string()));
        }
        Ok(())
    }

    pub async fn course_plan_count(&self, user_id: &str) -> usize {
        self.tables
            .read()
            .await
            .course_plans
            .iter()
            .filter(|p| p.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl PersistenceClient for InMemoryPersistenceClient {
    async fn save_chat(&self, chat: DBChat) -> Result<()> {
        self.check()?;
        self.tables
            .write()
            .await
            .chats
            .entry(chat.id.clone())
            .or_insert(chat);
        Ok(())
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<DBChat>> {
        self.check()?;
        Ok(self.tables.read().await.chats.get(chat_id).cloned())
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<DBChat>> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut chats: Vec<DBChat> = tables
            .chats
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(chats)
    }

    async fn update_chat_visibility(&self, chat_id: &str, visibility: Visibility) -> Result<()> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let chat = tables
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| PersistError::not_found("chat", chat_id))?;
        chat.visibility = visibility;
        Ok(())
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<()> {
        self.check()?;
        let mut tables = self.tables.write().await;
        tables.messages.retain(|m| m.chat_id != chat_id);
        tables.chats.remove(chat_id);
        Ok(())
    }

    async fn save_messages(&self, messages: Vec<DBMessage>) -> Result<()> {
        self.check()?;
        self.tables.write().await.messages.extend(messages);
        Ok(())
    }

    async fn get_messages(&self, chat_id: &str) -> Result<Vec<DBMessage>> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut messages: Vec<DBMessage> = tables
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn save_document(&self, document: DBDocument) -> Result<()> {
        self.check()?;
        self.tables.write().await.documents.push(document);
        Ok(())
    }

    async fn get_document(&self, document_id: &str) -> Result<Option<DBDocument>> {
        Ok(self.get_document_versions(document_id).await?.pop())
    }

    async fn get_document_versions(&self, document_id: &str) -> Result<Vec<DBDocument>> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut versions: Vec<DBDocument> = tables
            .documents
            .iter()
            .filter(|d| d.id == document_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(versions)
    }

    async fn save_suggestions(&self, suggestions: Vec<DBSuggestion>) -> Result<()> {
        self.check()?;
        self.tables.write().await.suggestions.extend(suggestions);
        Ok(())
    }

    async fn get_suggestions(&self, document_id: &str) -> Result<Vec<DBSuggestion>> {
        self.check()?;
        Ok(self
            .tables
            .read()
            .await
            .suggestions
            .iter()
            .filter(|s| s.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn upsert_profile(&self, mut profile: DBUserProfile) -> Result<()> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.profiles.get(&profile.user_id) {
            profile.created_at = existing.created_at;
        }
        profile.updated_at = Utc::now();
        tables.profiles.insert(profile.user_id.clone(), profile);
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<DBUserProfile>> {
        self.check()?;
        Ok(self.tables.read().await.profiles.get(user_id).cloned())
    }

    async fn save_course_plan(
        &self,
        user_id: &str,
        plan: CoursePlanContent,
    ) -> Result<DBCoursePlan> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let latest = tables
            .course_plans
            .iter_mut()
            .filter(|p| p.user_id == user_id)
            .max_by_key(|p| p.updated_at);

        match latest {
            Some(existing) => {
                existing.plan = plan;
                existing.updated_at = Utc::now();
                Ok(existing.clone())
            }
            None => {
                let saved = DBCoursePlan::new(user_id, plan);
                tables.course_plans.push(saved.clone());
                Ok(saved)
            }
        }
    }

    async fn list_course_plans(&self, user_id: &str) -> Result<Vec<DBCoursePlan>> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut plans: Vec<DBCoursePlan> = tables
            .course_plans
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(plans)
    }

    async fn get_course_plan(&self, plan_id: &str) -> Result<Option<DBCoursePlan>> {
        self.check()?;
        Ok(self
            .tables
            .read()
            .await
            .course_plans
            .iter()
            .find(|p| p.id == plan_id)
            .cloned())
    }

    async fn update_course_plan_modules(
        &self,
        plan_id: &str,
        modules: Vec<CourseModule>,
    ) -> Result<DBCoursePlan> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let plan = tables
            .course_plans
            .iter_mut()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| PersistError::not_found("course plan", plan_id))?;
        plan.plan.modules = modules;
        plan.updated_at = Utc::now();
        Ok(plan.clone())
    }
}
