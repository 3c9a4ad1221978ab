use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::ToSchema;

use amigo_graph::generate_title;
use amigo_llm::{Content, Message as LLMMessage, ToolCall};
use amigo_persist::{DBChat, DBMessage};
use amigo_types::{LLMConfig, SequencedEvent, TurnInput};

use crate::{
    auth::AuthSession,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageInput {
    pub id: String,
    /// `user`, `assistant` or `system`
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_invocations: Vec<ToolInvocationInput>,
}

/// A tool call the client already saw on an assistant message
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocationInput {
    pub tool_call_id: String,
    pub tool_name: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub args: serde_json::Value,
    #[schema(value_type = Option<Object>)]
    pub result: Option<serde_json::Value>,
    /// `partial-call`, `call` or `result`
    #[serde(default)]
    pub state: Option<String>,
}

impl ToolInvocationInput {
    fn is_complete(&self) -> bool {
        self.result.is_some() && self.state.as_deref().map_or(true, |s| s == "result")
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendChatRequest {
    /// Chat id chosen by the client; created on first use
    pub id: String,
    pub messages: Vec<ChatMessageInput>,
    pub model_id: String,
}

/// Send the conversation and stream the assistant's turn as Server-Sent Events
///
/// Every event carries its stream index as the SSE id and its type as the
/// SSE event name; the data is the JSON-encoded event.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = SendChatRequest,
    responses(
        (status = 200, description = "Streaming response", content_type = "text/event-stream"),
        (status = 400, description = "No user message"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Unknown model")
    ),
    tag = "chat"
)]
pub async fn send_chat_stream(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Json(req): Json<SendChatRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let model = state
        .catalog
        .find(&req.model_id)
        .cloned()
        .ok_or(ApiError::NotFound("Model"))?;

    let user_message = req
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .cloned()
        .ok_or_else(|| ApiError::BadRequest("No user message found".to_string()))?;

    let runtime = state
        .runtime(model.provider)
        .cloned()
        .ok_or_else(|| ApiError::Config(format!("no client configured for {:?}", model.provider)))?;

    match state.persist.get_chat(&req.id).await? {
        Some(chat) if !chat.is_owned_by(session.user_id()) => return Err(ApiError::Forbidden),
        Some(_) => {}
        None => {
            let title = generate_title(
                runtime.chat_client.as_ref(),
                &model.api_identifier,
                &user_message.content,
            )
            .await;
            state
                .persist
                .save_chat(DBChat::new(&req.id, session.user_id(), title))
                .await?;
        }
    }

    let user_message_id = uuid::Uuid::new_v4().to_string();
    state
        .persist
        .save_messages(vec![DBMessage::user(&user_message_id, &req.id, &user_message.content)])
        .await?;

    let input = TurnInput::new(
        &req.id,
        &user_message_id,
        to_llm_messages(&req.messages),
        LLMConfig::from(&model),
    )
    .with_user(session.user_id());

    tracing::info!(chat_id = %req.id, model = %model.id, "Starting chat turn");
    let receiver = runtime.graph.spawn_run(input);

    let sse_stream = ReceiverStream::new(receiver).map(|event| Ok(to_sse_event(&event)));
    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

fn to_llm_messages(messages: &[ChatMessageInput]) -> Vec<LLMMessage> {
    let mut out = Vec::with_capacity(messages.len());
    for m in messages {
        let has_text = !m.content.trim().is_empty();
        match m.role.as_str() {
            "user" if has_text => out.push(LLMMessage::human(m.content.as_str())),
            "system" if has_text => out.push(LLMMessage::system(m.content.as_str())),
            "assistant" => {
                // Calls without a result would leave the provider waiting on a tool reply
                let completed: Vec<&ToolInvocationInput> =
                    m.tool_invocations.iter().filter(|i| i.is_complete()).collect();
                if completed.is_empty() {
                    if has_text {
                        out.push(LLMMessage::ai(m.content.as_str()));
                    }
                    continue;
                }

                let calls = completed
                    .iter()
                    .map(|i| ToolCall::new(i.tool_call_id.as_str(), i.tool_name.as_str(), i.args.to_string()))
                    .collect();
                let text = has_text.then(|| Content::text(m.content.clone()));
                out.push(LLMMessage::ai_with_tools(text, calls));
                for invocation in completed {
                    let result = invocation.result.as_ref().map(|r| r.to_string()).unwrap_or_default();
                    out.push(LLMMessage::tool_result(invocation.tool_call_id.as_str(), result));
                }
            }
            "user" | "system" => {}
            other => tracing::debug!(role = %other, "Skipping message with unknown role"),
        }
    }
    out
}

pub(crate) fn to_sse_event(event: &SequencedEvent) -> Event {
    let id = event.index.to_string();
    Event::default()
        .id(id.clone())
        .event(event.event.event_name())
        .json_data(event)
        .unwrap_or_else(|e| {
            tracing::error!(index = event.index, error = %e, "Failed to encode stream event");
            Event::default()
                .id(id)
                .event("error")
                .data(r#"{"type":"error","message":"event encoding failed"}"#)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(role: &str, content: &str) -> ChatMessageInput {
        ChatMessageInput {
            id: format!("{}-1", role),
            role: role.to_string(),
            content: content.to_string(),
            tool_invocations: Vec::new(),
        }
    }

    fn invocation(id: &str, state: &str, result: Option<serde_json::Value>) -> ToolInvocationInput {
        ToolInvocationInput {
            tool_call_id: id.to_string(),
            tool_name: "generateInitialCoursePlan".to_string(),
            args: serde_json::json!({"learningGoals": "rust"}),
            result,
            state: Some(state.to_string()),
        }
    }

    #[test]
    fn test_history_conversion_skips_empty_and_unknown() {
        let messages = to_llm_messages(&[
            input("user", "hi"),
            input("assistant", ""),
            input("tool", "{}"),
            input("assistant", "hello"),
            input("user", "plan my week"),
        ]);
        let roles: Vec<&str> = messages.iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
    }

    #[test]
    fn test_history_keeps_completed_tool_invocations() {
        let mut assistant = input("assistant", "Here is a plan.");
        assistant.tool_invocations = vec![
            invocation("call-1", "result", Some(serde_json::json!({"success": true, "title": "Rust"}))),
            invocation("call-2", "call", None),
        ];
        let messages = to_llm_messages(&[input("user", "plan"), assistant, input("user", "save it")]);

        let roles: Vec<&str> = messages.iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec!["user", "assistant", "tool", "user"]);
        match &messages[1] {
            LLMMessage::AI { content, tool_calls: Some(calls), .. } => {
                assert_eq!(content.as_ref().map(Content::to_plain_text).as_deref(), Some("Here is a plan."));
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].function.name, "generateInitialCoursePlan");
            }
            other => panic!("expected assistant tool calls, got {:?}", other),
        }
        match &messages[2] {
            LLMMessage::Tool { tool_call_id, content } => {
                assert_eq!(tool_call_id, "call-1");
                assert!(content.to_plain_text().contains("\"title\":\"Rust\""));
            }
            other => panic!("expected tool result, got {:?}", other),
        }
    }

    #[test]
    fn test_tool_invocations_deserialize_from_client_shape() {
        let message: ChatMessageInput = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "role": "assistant",
            "content": "",
            "toolInvocations": [{
                "toolCallId": "call-1",
                "toolName": "createRoadmap",
                "args": {"roadmapEvents": []},
                "result": {"success": true},
                "state": "result"
            }]
        }))
        .unwrap();
        assert_eq!(message.tool_invocations.len(), 1);
        assert!(message.tool_invocations[0].is_complete());

        let messages = to_llm_messages(&[message]);
        assert_eq!(messages.len(), 2);
        assert!(matches!(&messages[0], LLMMessage::AI { content: None, tool_calls: Some(_), .. }));
    }
}
