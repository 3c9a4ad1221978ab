//! Turns the messages produced during a turn into storable rows.

use std::collections::{HashMap, HashSet};

use amigo_llm::{Content, Message};
use serde_json::Value;

use crate::models::{DBMessage, MessageContent, MessagePart, MessageRole};

/// Drops what should never be stored: tool calls that never got a result,
/// empty text, and messages left with nothing in them.
pub fn sanitize_response_messages(messages: &[Message]) -> Vec<Message> {
    let answered: HashSet<&str> = messages
        .iter()
        .filter_map(|m| match m {
            Message::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
            _ => None,
        })
        .collect();

    messages
        .iter()
        .filter_map(|message| match message {
            Message::AI { content, tool_calls, name } => {
                let content = content.clone().filter(|c| !c.is_empty());
                let tool_calls = tool_calls
                    .as_ref()
                    .map(|calls| {
                        calls
                            .iter()
                            .filter(|c| answered.contains(c.id.as_str()))
                            .cloned()
                            .collect::<Vec<_>>()
                    })
                    .filter(|calls| !calls.is_empty());

                if content.is_none() && tool_calls.is_none() {
                    return None;
                }
                Some(Message::AI { content, tool_calls, name: name.clone() })
            }
            Message::Tool { content, .. } if content.is_empty() => None,
            other => Some(other.clone()),
        })
        .collect()
}

/// Maps sanitized response messages to database rows for `chat_id`.
///
/// Assistant messages become text and tool-call parts; tool messages become
/// a tool-result part named after the call that produced it.
pub fn build_response_messages(chat_id: &str, messages: &[Message]) -> Vec<DBMessage> {
    let mut tool_names: HashMap<String, String> = HashMap::new();
    let mut rows = Vec::new();

    for message in messages {
        match message {
            Message::AI { content, tool_calls, .. } => {
                let mut parts = Vec::new();
                if let Some(text) = content.as_ref().map(Content::to_plain_text) {
                    if !text.is_empty() {
                        parts.push(MessagePart::Text { text });
                    }
                }
                for call in tool_calls.iter().flatten() {
                    tool_names.insert(call.id.clone(), call.function.name.clone());
                    parts.push(MessagePart::ToolCall {
                        tool_call_id: call.id.clone(),
                        tool_name: call.function.name.clone(),
                        args: call
                            .arguments_value()
                            .unwrap_or_else(|_| Value::String(call.function.arguments.clone())),
                    });
                }
                if !parts.is_empty() {
                    rows.push(DBMessage::new(chat_id, MessageRole::Assistant, MessageContent::Parts(parts)));
                }
            }
            Message::Tool { tool_call_id, content } => {
                let text = content.to_plain_text();
                let result = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
                let tool_name = tool_names.get(tool_call_id).cloned().unwrap_or_default();
                rows.push(DBMessage::new(
                    chat_id,
                    MessageRole::Tool,
                    MessageContent::Parts(vec![MessagePart::ToolResult {
                        tool_call_id: tool_call_id.clone(),
                        tool_name,
                        result,
                    }]),
                ));
            }
            Message::Human { content, .. } => {
                rows.push(DBMessage::new(
                    chat_id,
                    MessageRole::User,
                    MessageContent::Text(content.to_plain_text()),
                ));
            }
            Message::System { .. } => {}
        }
    }

    // Rows created in the same instant must still sort in turn order
    let base = chrono::Utc::now();
    for (offset, row) in rows.iter_mut().enumerate() {
        row.created_at = base + chrono::Duration::milliseconds(offset as i64);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use amigo_llm::ToolCall;
    use serde_json::json;

    #[test]
    fn test_unanswered_tool_calls_are_dropped() {
        let messages = vec![
            Message::ai_with_tools(
                Some(Content::text("Let me check")),
                vec![ToolCall::new("c1", "getWeather", "{}"), ToolCall::new("c2", "createDocument", "{}")],
            ),
            Message::tool_result("c1", "{\"temperature\":12}"),
        ];
        let sanitized = sanitize_response_messages(&messages);
        match &sanitized[0] {
            Message::AI { tool_calls: Some(calls), .. } => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].id, "c1");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_empty_assistant_message_is_dropped() {
        let messages = vec![
            Message::ai_with_tools(Some(Content::text("")), vec![ToolCall::new("c1", "getWeather", "{}")]),
            Message::ai("Done"),
        ];
        let sanitized = sanitize_response_messages(&messages);
        assert_eq!(sanitized.len(), 1);
        assert_eq!(sanitized[0].text(), "Done");
    }

    #[test]
    fn test_tool_result_takes_name_from_call() {
        let messages = vec![
            Message::ai_with_tools(None, vec![ToolCall::new("c1", "getWeather", "{\"latitude\":1}")]),
            Message::tool_result("c1", "{\"temperature\":12}"),
            Message::ai("It is 12 degrees."),
        ];
        let rows = build_response_messages("chat-1", &messages);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].role, MessageRole::Tool);
        assert_eq!(
            rows[1].content,
            MessageContent::Parts(vec![MessagePart::ToolResult {
                tool_call_id: "c1".into(),
                tool_name: "getWeather".into(),
                result: json!({"temperature": 12}),
            }])
        );
        assert!(rows[0].created_at < rows[2].created_at);
    }

    #[test]
    fn test_non_json_tool_result_is_stored_as_string() {
        let messages = vec![
            Message::ai_with_tools(None, vec![ToolCall::new("c1", "getWeather", "")]),
            Message::tool_result("c1", "sunny"),
        ];
        let rows = build_response_messages("chat-1", &messages);
        match &rows[0].content {
            MessageContent::Parts(parts) => assert_eq!(
                parts[0],
                MessagePart::ToolCall { tool_call_id: "c1".into(), tool_name: "getWeather".into(), args: json!({}) }
            ),
            other => panic!("unexpected content: {:?}", other),
        }
        match &rows[1].content {
            MessageContent::Parts(parts) => assert!(matches!(
                &parts[0],
                MessagePart::ToolResult { result: Value::String(s), .. } if s == "sunny"
            )),
            other => panic!("unexpected content: {:?}", other),
        }
    }
}
