pub mod builder;
pub mod data_stream;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod prompts;
pub mod router;
pub mod title;
pub mod tools;

pub use builder::GraphBuilder;
pub use data_stream::{ArtifactWriter, DataStreamWriter, StreamClosed};
pub use graph::Graph;
pub use node::{Node, NodeType};
pub use router::{NextNode, Router, SimpleRouter};
pub use title::{fallback_title, generate_title, MAX_TITLE_CHARS};
pub use tools::{Tool, ToolContext, ToolError, ToolRegistry, ToolServices, WeatherTool};

// Re-export key types from amigo-types
pub use amigo_types::{GraphConfig, LLMConfig, SequencedEvent, StreamEvent, TurnInput, TurnState};
