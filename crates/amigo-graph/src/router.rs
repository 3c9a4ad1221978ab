use crate::node::NodeType;
use amigo_types::TurnState;

/// Decides which node to execute next based on current state
pub trait Router: Send + Sync {
    fn next(&self, state: &TurnState, current: NodeType) -> NextNode;
}

#[derive(Debug, Clone, PartialEq)]
pub enum NextNode {
    LLM,
    Tool,
    End,
}

/// LLM -> Tool (if tool calls are pending) -> LLM -> End
pub struct SimpleRouter;

impl Router for SimpleRouter {
    fn next(&self, state: &TurnState, current: NodeType) -> NextNode {
        match current {
            NodeType::LLM => {
                if state.has_pending_tool_calls() {
                    NextNode::Tool
                } else {
                    NextNode::End
                }
            }
            NodeType::Tool => NextNode::LLM,
        }
    }
}
