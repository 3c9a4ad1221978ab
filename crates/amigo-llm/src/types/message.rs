use serde::{Deserialize, Serialize};
use super::content::Content;
use super::tool::ToolCall;

/// Provider-agnostic chat message, tagged by role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: Content,

        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    #[serde(rename = "user")]
    Human {
        content: Content,

        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    #[serde(rename = "assistant")]
    AI {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<Content>,

        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,

        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    Tool {
        tool_call_id: String,
        content: Content,
    },
}

impl Message {
    pub fn system(content: impl Into<Content>) -> Self {
        Self::System {
            content: content.into(),
            name: None,
        }
    }

    pub fn human(content: impl Into<Content>) -> Self {
        Self::Human {
            content: content.into(),
            name: None,
        }
    }

    pub fn ai(content: impl Into<Content>) -> Self {
        Self::AI {
            content: Some(content.into()),
            tool_calls: None,
            name: None,
        }
    }

    /// Assistant message that requests tool calls, with optional leading text
    pub fn ai_with_tools(content: Option<Content>, tool_calls: Vec<ToolCall>) -> Self {
        Self::AI {
            content,
            tool_calls: Some(tool_calls),
            name: None,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<Content>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> &str {
        match self {
            Self::System { .. } => "system",
            Self::Human { .. } => "user",
            Self::AI { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    /// Plain text of the message, empty when it only carries tool calls
    pub fn text(&self) -> String {
        match self {
            Self::System { content, .. }
            | Self::Human { content, .. }
            | Self::Tool { content, .. } => content.to_plain_text(),
            Self::AI { content, .. } => content
                .as_ref()
                .map(Content::to_plain_text)
                .unwrap_or_default(),
        }
    }
}
