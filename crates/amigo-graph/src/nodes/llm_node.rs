use std::collections::BTreeMap;
use std::sync::Arc;

use amigo_llm::{ChatClient, ChatEventStream, ChatOptions, ChatRequest, Content, Message, ToolCall, ToolChoice};
use amigo_types::{StreamEvent, TurnState};
use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;

use crate::data_stream::DataStreamWriter;
use crate::node::{Node, NodeType};
use crate::prompts::SYSTEM_PROMPT;
use crate::tools::ToolRegistry;

#[derive(Default)]
struct ToolCallBuffer {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

pub struct LLMNode {
    client: Arc<dyn ChatClient>,
    tools: Arc<ToolRegistry>,
    system_prompt: String,
}

impl LLMNode {
    pub fn new(client: Arc<dyn ChatClient>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            client,
            tools,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    async fn create_stream(&self, state: &TurnState) -> Result<ChatEventStream> {
        let mut options = ChatOptions::new();
        if !self.tools.is_empty() {
            options = options
                .tools(self.tools.definitions())
                .tool_choice(ToolChoice::auto());
        }
        if let Some(temp) = state.llm_config.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = state.llm_config.max_tokens {
            options = options.max_tokens(max_tokens);
        }

        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(Message::system(self.system_prompt.as_str()));
        messages.extend(state.messages.iter().cloned());

        tracing::debug!(model = %state.llm_config.model, messages = messages.len(), "Starting model step");

        let request = ChatRequest::new(state.llm_config.model.clone(), messages).with_options(options);
        self.client.chat_stream(request).await
    }

    /// Forwards tokens and tool-call fragments, then assembles the assistant message
    async fn process_stream(
        &self,
        mut stream: ChatEventStream,
        writer: &DataStreamWriter,
    ) -> Result<(Message, Option<String>)> {
        let mut text = String::new();
        let mut buffers: BTreeMap<u32, ToolCallBuffer> = BTreeMap::new();
        let mut finish_reason = None;

        while let Some(event) = stream.next().await {
            match event? {
                amigo_llm::StreamEvent::Message { content } => {
                    text.push_str(&content);
                    writer.write(StreamEvent::Text { content }).await?;
                }
                amigo_llm::StreamEvent::ToolCall { index, id, name, arguments } => {
                    let entry = buffers.entry(index).or_default();
                    if let Some(id) = &id {
                        entry.id = Some(id.clone());
                    }
                    if let Some(name) = &name {
                        entry.name = Some(name.clone());
                    }
                    if let Some(args) = &arguments {
                        entry.arguments.push_str(args);
                    }
                    writer
                        .write(StreamEvent::ToolCall { call_index: index, id, name, arguments })
                        .await?;
                }
                amigo_llm::StreamEvent::Done { finish_reason: reason } => finish_reason = reason,
            }
        }

        let tool_calls: Vec<ToolCall> = buffers
            .into_iter()
            .filter_map(|(index, buffer)| {
                let name = buffer.name?;
                let id = buffer.id.unwrap_or_else(|| format!("call_{}", index));
                Some(ToolCall::new(id, name, buffer.arguments))
            })
            .collect();

        let content = (!text.is_empty()).then(|| Content::text(text));
        let message = if tool_calls.is_empty() {
            Message::AI { content, tool_calls: None, name: None }
        } else {
            Message::ai_with_tools(content, tool_calls)
        };
        Ok((message, finish_reason))
    }
}

#[async_trait]
impl Node for LLMNode {
    async fn execute(&self, state: &mut TurnState, writer: &DataStreamWriter) -> Result<()> {
        let stream = self.create_stream(state).await?;
        let (message, finish_reason) = self.process_stream(stream, writer).await?;

        state.add_message(message);
        writer.write(StreamEvent::FinishStep { finish_reason }).await?;
        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::LLM
    }
}
