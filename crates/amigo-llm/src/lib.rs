pub mod types;
pub mod traits;
pub mod streaming;
pub mod structured;
pub mod openai;
pub mod config;

#[cfg(feature = "testing")]
pub mod scripted;

pub use traits::{
    ChatClient,
    ImageClient,
    ChatEventStream, ChatRequest, ChatResponse, ChatOptions,
    ImageRequest, GeneratedImage,
    ResponseFormat,
    TokenUsage,
};

pub use streaming::StreamEvent;
pub use openai::OpenAIClient;
pub use config::{ClientFactory, ProviderConfig, ProviderType};
pub use structured::{
    generate_object, parse_partial_json, stream_elements, stream_object,
    ElementStream, ObjectRequest, ObjectStream,
};
pub use types::{Message, Content, Tool, ToolCall, ToolChoice};
