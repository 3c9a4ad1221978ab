use crate::config::LLMConfig;
use amigo_llm::{Content, Message, ToolCall};
use serde::{Deserialize, Serialize};

/// Working state of one chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnState {
    pub chat_id: String,
    pub user_id: Option<String>,
    pub run_id: String,
    pub messages: Vec<Message>,
    /// Index of the first message produced during this turn
    pub response_start: usize,
    pub llm_config: LLMConfig,
}

impl TurnState {
    pub fn from_input(input: TurnInput) -> Self {
        let response_start = input.messages.len();
        Self {
            chat_id: input.chat_id,
            user_id: input.user_id,
            run_id: uuid::Uuid::new_v4().to_string(),
            messages: input.messages,
            response_start,
            llm_config: input.llm_config,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn has_pending_tool_calls(&self) -> bool {
        !self.get_pending_tool_calls().is_empty()
    }

    pub fn get_pending_tool_calls(&self) -> Vec<ToolCall> {
        match self.last_message() {
            Some(Message::AI { tool_calls: Some(calls), .. }) => calls.clone(),
            _ => Vec::new(),
        }
    }

    pub fn add_tool_result(&mut self, tool_call_id: String, result: String) {
        self.messages.push(Message::Tool {
            tool_call_id,
            content: Content::text(result),
        });
    }

    /// Messages generated by the model and tools in this turn
    pub fn response_messages(&self) -> &[Message] {
        self.messages.get(self.response_start..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInput {
    pub chat_id: String,
    pub user_id: Option<String>,
    /// Server id of the user message opening this turn
    pub user_message_id: String,
    /// Conversation so far, ending with the new user message
    pub messages: Vec<Message>,
    pub llm_config: LLMConfig,
}

impl TurnInput {
    pub fn new(
        chat_id: impl Into<String>,
        user_message_id: impl Into<String>,
        messages: Vec<Message>,
        llm_config: LLMConfig,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_id: None,
            user_message_id: user_message_id.into(),
            messages,
            llm_config,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelProvider;

    #[test]
    fn test_response_messages_exclude_history() {
        let input = TurnInput::new(
            "chat-1",
            "msg-1",
            vec![Message::human("hi")],
            LLMConfig::new("gemini-2.0-flash", ModelProvider::Google),
        );
        let mut state = TurnState::from_input(input);
        assert!(state.response_messages().is_empty());

        state.add_message(Message::ai_with_tools(None, vec![ToolCall::new("c1", "getWeather", "{}")]));
        assert!(state.has_pending_tool_calls());

        state.add_tool_result("c1".into(), "{}".into());
        assert!(!state.has_pending_tool_calls());
        assert_eq!(state.response_messages().len(), 2);
    }
}
