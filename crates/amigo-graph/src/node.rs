use anyhow::Result;
use async_trait::async_trait;
use amigo_types::TurnState;

use crate::data_stream::DataStreamWriter;

/// Core abstraction for a unit of computation in the turn loop
#[async_trait]
pub trait Node: Send + Sync {
    /// Execute the node's logic, modifying state and writing events
    async fn execute(&self, state: &mut TurnState, writer: &DataStreamWriter) -> Result<()>;

    fn node_type(&self) -> NodeType;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    LLM,
    Tool,
}
