#[cfg(feature = "mongodb")]
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
#[cfg(feature = "mongodb")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "mongodb")]
use chrono::{DateTime, Utc};
#[cfg(feature = "mongodb")]
use amigo_types::{CoursePlanContent, DocumentKind};

#[cfg(feature = "mongodb")]
use crate::models::{
    DBChat, DBCoursePlan, DBDocument, DBMessage, DBSuggestion, DBUserProfile, MessageContent,
    MessageRole, Visibility,
};

#[cfg(feature = "mongodb")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoChat {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub visibility: Visibility,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "mongodb")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub chat_id: String,
    pub role: MessageRole,
    pub content: MessageContent,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// One row per document version; `document_id` + `created_at` identify it
#[cfg(feature = "mongodb")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDocument {
    #[serde(rename = "_id")]
    pub row_id: ObjectId,
    pub document_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub content: Option<String>,
    pub kind: DocumentKind,
    pub user_id: String,
}

#[cfg(feature = "mongodb")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSuggestion {
    #[serde(rename = "_id")]
    pub id: String,
    pub document_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub document_created_at: DateTime<Utc>,
    pub original_text: String,
    pub suggested_text: String,
    pub description: Option<String>,
    pub is_resolved: bool,
    pub user_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Keyed by user id; one profile per user
#[cfg(feature = "mongodb")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserProfile {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub name: String,
    pub education: Option<String>,
    pub past_experience: Option<String>,
    pub learning_goals: Option<String>,
    pub current_goal: Option<String>,
    pub daily_time_commitment: Option<String>,
    pub prior_knowledge: Option<String>,
    pub avatar_fallback: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "mongodb")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCoursePlan {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub plan: CoursePlanContent,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

// Conversions between database-agnostic and MongoDB-specific models

#[cfg(feature = "mongodb")]
impl From<DBChat> for MongoChat {
    fn from(chat: DBChat) -> Self {
        Self {
            id: chat.id,
            user_id: chat.user_id,
            title: chat.title,
            visibility: chat.visibility,
            created_at: chat.created_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<MongoChat> for DBChat {
    fn from(chat: MongoChat) -> Self {
        Self {
            id: chat.id,
            user_id: chat.user_id,
            title: chat.title,
            visibility: chat.visibility,
            created_at: chat.created_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<DBMessage> for MongoMessage {
    fn from(msg: DBMessage) -> Self {
        Self {
            id: msg.id,
            chat_id: msg.chat_id,
            role: msg.role,
            content: msg.content,
            created_at: msg.created_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<MongoMessage> for DBMessage {
    fn from(msg: MongoMessage) -> Self {
        Self {
            id: msg.id,
            chat_id: msg.chat_id,
            role: msg.role,
            content: msg.content,
            created_at: msg.created_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<DBDocument> for MongoDocument {
    fn from(doc: DBDocument) -> Self {
        Self {
            row_id: ObjectId::new(),
            document_id: doc.id,
            created_at: doc.created_at,
            title: doc.title,
            content: doc.content,
            kind: doc.kind,
            user_id: doc.user_id,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<MongoDocument> for DBDocument {
    fn from(doc: MongoDocument) -> Self {
        Self {
            id: doc.document_id,
            created_at: doc.created_at,
            title: doc.title,
            content: doc.content,
            kind: doc.kind,
            user_id: doc.user_id,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<DBSuggestion> for MongoSuggestion {
    fn from(s: DBSuggestion) -> Self {
        Self {
            id: s.id,
            document_id: s.document_id,
            document_created_at: s.document_created_at,
            original_text: s.original_text,
            suggested_text: s.suggested_text,
            description: s.description,
            is_resolved: s.is_resolved,
            user_id: s.user_id,
            created_at: s.created_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<MongoSuggestion> for DBSuggestion {
    fn from(s: MongoSuggestion) -> Self {
        Self {
            id: s.id,
            document_id: s.document_id,
            document_created_at: s.document_created_at,
            original_text: s.original_text,
            suggested_text: s.suggested_text,
            description: s.description,
            is_resolved: s.is_resolved,
            user_id: s.user_id,
            created_at: s.created_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<DBUserProfile> for MongoUserProfile {
    fn from(p: DBUserProfile) -> Self {
        Self {
            user_id: p.user_id,
            name: p.name,
            education: p.education,
            past_experience: p.past_experience,
            learning_goals: p.learning_goals,
            current_goal: p.current_goal,
            daily_time_commitment: p.daily_time_commitment,
            prior_knowledge: p.prior_knowledge,
            avatar_fallback: p.avatar_fallback,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<MongoUserProfile> for DBUserProfile {
    fn from(p: MongoUserProfile) -> Self {
        Self {
            user_id: p.user_id,
            name: p.name,
            education: p.education,
            past_experience: p.past_experience,
            learning_goals: p.learning_goals,
            current_goal: p.current_goal,
            daily_time_commitment: p.daily_time_commitment,
            prior_knowledge: p.prior_knowledge,
            avatar_fallback: p.avatar_fallback,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<DBCoursePlan> for MongoCoursePlan {
    fn from(p: DBCoursePlan) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            plan: p.plan,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<MongoCoursePlan> for DBCoursePlan {
    fn from(p: MongoCoursePlan) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            plan: p.plan,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
