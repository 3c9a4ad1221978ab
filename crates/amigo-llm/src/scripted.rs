//! In-process clients that replay scripted responses.

use crate::streaming::StreamEvent;
use crate::traits::{
    ChatClient, ChatEventStream, ChatRequest, ChatResponse, GeneratedImage, ImageClient,
    ImageRequest,
};
use crate::types::ToolCall;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum ScriptedTurn {
    Events(Vec<StreamEvent>),
    Fail(String),
}

/// Chat client answering each call with the next queued turn
#[derive(Debug, Default)]
pub struct ScriptedChatClient {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, turn: ScriptedTurn) -> &Self {
        if let Ok(mut turns) = self.turns.lock() {
            turns.push_back(turn);
        }
        self
    }

    /// Text answer streamed word by word
    pub fn push_text(&self, text: &str) -> &Self {
        let mut events: Vec<StreamEvent> = text
            .split_inclusive(' ')
            .map(|chunk| StreamEvent::Message { content: chunk.to_string() })
            .collect();
        events.push(StreamEvent::Done { finish_reason: Some("stop".to_string()) });
        self.push(ScriptedTurn::Events(events))
    }

    pub fn push_tool_call(&self, id: &str, name: &str, arguments: serde_json::Value) -> &Self {
        self.push(ScriptedTurn::Events(vec![
            StreamEvent::ToolCall {
                index: 0,
                id: Some(id.to_string()),
                name: Some(name.to_string()),
                arguments: Some(arguments.to_string()),
            },
            StreamEvent::Done { finish_reason: Some("tool_calls".to_string()) },
        ]))
    }

    pub fn push_failure(&self, message: &str) -> &Self {
        self.push(ScriptedTurn::Fail(message.to_string()))
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next_turn(&self, request: ChatRequest) -> Result<Vec<StreamEvent>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let turn = self.turns.lock().ok().and_then(|mut t| t.pop_front());
        match turn {
            Some(ScriptedTurn::Events(events)) => Ok(events),
            Some(ScriptedTurn::Fail(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("no scripted response left")),
        }
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let events = self.next_turn(request)?;

        let mut content = String::new();
        let mut tool_calls: Vec<ToolCall> = Vec::new();
        let mut finish_reason = None;
        for event in events {
            match event {
                StreamEvent::Message { content: c } => content.push_str(&c),
                StreamEvent::ToolCall { id, name, arguments, .. } => tool_calls.push(ToolCall::new(
                    id.unwrap_or_default(),
                    name.unwrap_or_default(),
                    arguments.unwrap_or_default(),
                )),
                StreamEvent::Done { finish_reason: r } => finish_reason = r,
            }
        }

        Ok(ChatResponse {
            content: (!content.is_empty()).then_some(content),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            usage: None,
            finish_reason,
            raw: serde_json::Value::Null,
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatEventStream> {
        let events = self.next_turn(request)?;
        Ok(Box::pin(futures::stream::iter(events.into_iter().map(Ok))))
    }
}

/// Image client returning a fixed payload, or failing when built with `failing`
#[derive(Debug, Clone)]
pub struct ScriptedImageClient {
    result: std::result::Result<String, String>,
}

impl ScriptedImageClient {
    pub fn returning(base64: impl Into<String>) -> Self {
        Self { result: Ok(base64.into()) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { result: Err(message.into()) }
    }
}

#[async_trait]
impl ImageClient for ScriptedImageClient {
    async fn generate_image(&self, _request: ImageRequest) -> Result<GeneratedImage> {
        match &self.result {
            Ok(base64) => Ok(GeneratedImage { base64: base64.clone() }),
            Err(message) => Err(anyhow::anyhow!(message.clone())),
        }
    }
}
