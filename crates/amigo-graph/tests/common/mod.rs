#![allow(dead_code)]

use std::sync::Arc;

use amigo_graph::{Graph, GraphBuilder, GraphConfig, ToolRegistry};
use amigo_llm::scripted::{ScriptedChatClient, ScriptedImageClient};
use amigo_llm::Message;
use amigo_persist::{InMemoryPersistenceClient, ProfileCache};
use amigo_types::{DataPart, LLMConfig, ModelProvider, SequencedEvent, StreamEvent, TurnInput};
use serde_json::Value;

pub struct Harness {
    pub llm: Arc<ScriptedChatClient>,
    pub store: Arc<InMemoryPersistenceClient>,
    pub graph: Graph,
}

pub struct HarnessOptions {
    pub config: GraphConfig,
    pub tools: Option<ToolRegistry>,
    pub image: Option<ScriptedImageClient>,
    pub cache: Option<Arc<dyn ProfileCache>>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            config: GraphConfig::default(),
            tools: None,
            image: None,
            cache: None,
        }
    }
}

pub fn harness() -> Harness {
    harness_with(HarnessOptions::default())
}

pub fn harness_with(options: HarnessOptions) -> Harness {
    let llm = Arc::new(ScriptedChatClient::new());
    let store = Arc::new(InMemoryPersistenceClient::new());

    let mut builder = GraphBuilder::new()
        .chat_client(llm.clone())
        .persistence(store.clone())
        .config(options.config);
    if let Some(tools) = options.tools {
        builder = builder.tools(tools);
    }
    if let Some(image) = options.image {
        builder = builder.image_client(Arc::new(image), "test-image-model");
    }
    if let Some(cache) = options.cache {
        builder = builder.profile_cache(cache);
    }

    Harness {
        llm,
        store,
        graph: builder.build().unwrap(),
    }
}

pub async fn run_turn(graph: &Graph, user_id: Option<&str>, text: &str) -> Vec<SequencedEvent> {
    let mut input = TurnInput::new(
        "chat-1",
        "user-msg-1",
        vec![Message::human(text)],
        LLMConfig::new("test-model", ModelProvider::Google),
    );
    if let Some(user_id) = user_id {
        input = input.with_user(user_id);
    }

    let mut rx = graph.spawn_run(input);
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

pub fn data_parts(events: &[SequencedEvent]) -> Vec<DataPart> {
    events.iter().filter_map(|e| e.event.as_data().cloned()).collect()
}

/// (tool name, result, is_error) for every tool result in the turn
pub fn tool_results(events: &[SequencedEvent]) -> Vec<(String, Value, bool)> {
    events
        .iter()
        .filter_map(|e| match &e.event {
            StreamEvent::ToolResult { tool_name, result, is_error, .. } => {
                Some((tool_name.clone(), result.clone(), *is_error))
            }
            _ => None,
        })
        .collect()
}

pub fn end_status(events: &[SequencedEvent]) -> Option<String> {
    events.iter().rev().find_map(|e| match &e.event {
        StreamEvent::End { status, .. } => Some(status.clone()),
        _ => None,
    })
}

/// Every `clear` is followed by exactly one `finish` before the next `clear`
pub fn assert_artifacts_balanced(parts: &[DataPart]) {
    let mut open = false;
    for part in parts {
        match part {
            DataPart::Clear(_) => {
                assert!(!open, "clear while an artifact is still open");
                open = true;
            }
            DataPart::Finish => {
                assert!(open, "finish without clear");
                open = false;
            }
            DataPart::TextDelta(_) | DataPart::CodeDelta(_) | DataPart::ImageDelta(_) => {
                assert!(open, "delta outside clear/finish");
            }
            _ => {}
        }
    }
    assert!(!open, "artifact never finished");
}
