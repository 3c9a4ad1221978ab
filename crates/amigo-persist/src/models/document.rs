use amigo_types::{DocumentKind, SuggestionPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One version of a document; (`id`, `created_at`) is the key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DBDocument {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub content: Option<String>,
    pub kind: DocumentKind,
    pub user_id: String,
}

impl DBDocument {
    pub fn new_version(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: DocumentKind,
        content: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            title: title.into(),
            content: Some(content.into()),
            kind,
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DBSuggestion {
    pub id: String,
    pub document_id: String,
    /// Version of the document the suggestion was made against
    pub document_created_at: DateTime<Utc>,
    pub original_text: String,
    pub suggested_text: String,
    pub description: Option<String>,
    pub is_resolved: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl DBSuggestion {
    pub fn from_payload(
        payload: &SuggestionPayload,
        document_created_at: DateTime<Utc>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: payload.id.clone(),
            document_id: payload.document_id.clone(),
            document_created_at,
            original_text: payload.original_text.clone(),
            suggested_text: payload.suggested_text.clone(),
            description: Some(payload.description.clone()).filter(|d| !d.is_empty()),
            is_resolved: payload.is_resolved,
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }
}
