use std::sync::Arc;
use std::time::Instant;

use amigo_llm::ChatClient;
use amigo_persist::{build_response_messages, sanitize_response_messages, MessageRole};
use amigo_types::{DataPart, GraphConfig, SequencedEvent, StreamEvent, TurnInput, TurnState};
use anyhow::Result;
use tokio::sync::mpsc;

use crate::data_stream::DataStreamWriter;
use crate::node::{Node, NodeType};
use crate::nodes::{LLMNode, ToolNode};
use crate::router::{NextNode, Router, SimpleRouter};
use crate::tools::{ToolRegistry, ToolServices};

pub struct Graph {
    chat_client: Arc<dyn ChatClient>,
    tools: Arc<ToolRegistry>,
    services: Arc<ToolServices>,
    config: GraphConfig,
}

impl Graph {
    pub(crate) fn new(
        chat_client: Arc<dyn ChatClient>,
        tools: Arc<ToolRegistry>,
        services: Arc<ToolServices>,
        config: GraphConfig,
    ) -> Self {
        Self {
            chat_client,
            tools,
            services,
            config,
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::GraphBuilder {
        crate::builder::GraphBuilder::new()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Spawn the turn in the background and return its event stream
    pub fn spawn_run(&self, input: TurnInput) -> mpsc::Receiver<SequencedEvent> {
        let (writer, rx) = DataStreamWriter::channel(self.config.channel_capacity);

        let llm_node = LLMNode::new(Arc::clone(&self.chat_client), Arc::clone(&self.tools));
        let tool_node = ToolNode::new(Arc::clone(&self.tools), Arc::clone(&self.services));
        let services = Arc::clone(&self.services);
        let config = self.config.clone();

        tokio::spawn(async move {
            let start = Instant::now();
            let chat_id = input.chat_id.clone();
            let outcome = tokio::time::timeout(
                config.execution_timeout,
                Self::execute_loop(input, &writer, &llm_node, &tool_node, &services, &config),
            )
            .await;

            let message = match outcome {
                Ok(Ok(())) => return,
                Ok(Err(e)) => format!("{:#}", e),
                Err(_) => format!("Turn timed out after {}s", config.execution_timeout.as_secs()),
            };
            tracing::error!(chat_id = %chat_id, error = %message, "Turn failed");

            match writer.finish_open_artifacts().await {
                Ok(0) => {}
                Ok(closed) => tracing::debug!(chat_id = %chat_id, closed, "Closed artifacts left open by the failed turn"),
                Err(_) => return,
            }
            if writer.write(StreamEvent::Error { message }).await.is_ok() {
                let _ = writer
                    .write(StreamEvent::End {
                        status: "error".to_string(),
                        total_duration_ms: start.elapsed().as_millis() as u64,
                    })
                    .await;
            }
        });

        rx
    }

    async fn execute_loop(
        input: TurnInput,
        writer: &DataStreamWriter,
        llm_node: &LLMNode,
        tool_node: &ToolNode,
        services: &ToolServices,
        config: &GraphConfig,
    ) -> Result<()> {
        let start_time = Instant::now();
        let user_message_id = input.user_message_id.clone();
        let mut state = TurnState::from_input(input);

        writer
            .write(StreamEvent::Start {
                run_id: state.run_id.clone(),
                chat_id: state.chat_id.clone(),
                timestamp: chrono::Utc::now().timestamp_millis(),
            })
            .await?;
        writer.write_data(DataPart::UserMessageId(user_message_id)).await?;

        let router = SimpleRouter;
        let mut current_node = NodeType::LLM;
        let mut steps = 0;

        loop {
            if current_node == NodeType::LLM {
                if steps >= config.max_steps {
                    tracing::warn!(chat_id = %state.chat_id, max_steps = config.max_steps, "Step limit reached");
                    break;
                }
                steps += 1;
            }

            match current_node {
                NodeType::LLM => llm_node.execute(&mut state, writer).await?,
                NodeType::Tool => tool_node.execute(&mut state, writer).await?,
            }

            match router.next(&state, current_node) {
                NextNode::End => break,
                NextNode::LLM => current_node = NodeType::LLM,
                NextNode::Tool => current_node = NodeType::Tool,
            }
        }

        Self::persist_response(&state, writer, services).await?;

        writer
            .write(StreamEvent::End {
                status: "success".to_string(),
                total_duration_ms: start_time.elapsed().as_millis() as u64,
            })
            .await?;

        tracing::info!(
            chat_id = %state.chat_id,
            steps,
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Turn completed"
        );
        Ok(())
    }

    /// Stores the sanitized response and announces the ids of stored assistant messages
    async fn persist_response(
        state: &TurnState,
        writer: &DataStreamWriter,
        services: &ToolServices,
    ) -> Result<()> {
        if state.user_id.is_none() {
            return Ok(());
        }

        let sanitized = sanitize_response_messages(state.response_messages());
        let rows = build_response_messages(&state.chat_id, &sanitized);
        if rows.is_empty() {
            return Ok(());
        }

        let assistant_ids: Vec<String> = rows
            .iter()
            .filter(|row| row.role == MessageRole::Assistant)
            .map(|row| row.id.clone())
            .collect();

        if let Err(e) = services.persistence.save_messages(rows).await {
            tracing::error!(chat_id = %state.chat_id, error = %e, "Failed to save chat");
            return Ok(());
        }

        for id in assistant_ids {
            writer
                .write(StreamEvent::MessageAnnotation { message_id_from_server: id })
                .await?;
        }
        Ok(())
    }
}
