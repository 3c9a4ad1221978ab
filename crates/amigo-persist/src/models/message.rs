use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

/// One part of a stored message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessagePart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        args: Value,
    },
    #[serde(rename_all = "camelCase")]
    ToolResult {
        tool_call_id: String,
        tool_name: String,
        result: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<MessagePart>),
}

impl MessageContent {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

/// Database-agnostic message model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DBMessage {
    pub id: String,
    pub chat_id: String,
    pub role: MessageRole,
    pub content: MessageContent,
    pub created_at: DateTime<Utc>,
}

impl DBMessage {
    pub fn new(chat_id: impl Into<String>, role: MessageRole, content: MessageContent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            role,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn user(id: impl Into<String>, chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            chat_id: chat_id.into(),
            role: MessageRole::User,
            content: MessageContent::Text(text.into()),
            created_at: Utc::now(),
        }
    }
}
