use std::sync::Arc;
use std::time::Instant;

use amigo_types::{StreamEvent, TurnState};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::data_stream::DataStreamWriter;
use crate::node::{Node, NodeType};
use crate::tools::{ToolContext, ToolError, ToolRegistry, ToolServices};

pub struct ToolNode {
    tools: Arc<ToolRegistry>,
    services: Arc<ToolServices>,
}

impl ToolNode {
    pub fn new(tools: Arc<ToolRegistry>, services: Arc<ToolServices>) -> Self {
        Self { tools, services }
    }

    async fn run_tool(&self, name: &str, arguments: &str, ctx: &ToolContext) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let args: Value = if arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))?
        };

        tool.execute(args, ctx).await
    }
}

#[async_trait]
impl Node for ToolNode {
    async fn execute(&self, state: &mut TurnState, writer: &DataStreamWriter) -> Result<()> {
        let tool_calls = state.get_pending_tool_calls();
        if tool_calls.is_empty() {
            return Ok(());
        }

        let ctx = ToolContext {
            chat_id: state.chat_id.clone(),
            user_id: state.user_id.clone(),
            model: state.llm_config.model.clone(),
            writer: writer.clone(),
            services: Arc::clone(&self.services),
        };

        // Sequential: a streaming tool drains its sub-stream before the next starts
        for tool_call in tool_calls {
            let start = Instant::now();
            let name = tool_call.function.name.clone();

            let (result, is_error) = match self.run_tool(&name, &tool_call.function.arguments, &ctx).await {
                Ok(value) => (value, false),
                Err(ToolError::Stream(closed)) => return Err(closed.into()),
                Err(e) => {
                    tracing::warn!(tool = %name, error = %e, "Tool failed");
                    (json!({ "error": e.to_string() }), true)
                }
            };

            let duration_ms = start.elapsed().as_millis() as u64;
            tracing::info!(tool = %name, duration_ms, is_error, "Tool finished");

            // A failed tool may drop its artifact before the fallback could enqueue `finish`
            writer.finish_open_artifacts().await?;

            writer
                .write(StreamEvent::ToolResult {
                    tool_call_id: tool_call.id.clone(),
                    tool_name: name,
                    result: result.clone(),
                    is_error,
                    duration_ms,
                })
                .await?;

            state.add_tool_result(tool_call.id, result.to_string());
        }

        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Tool
    }
}
