//! Tools the model may call during a turn.
//!
//! Every tool returns a JSON value. Expected failures (missing document,
//! storage trouble) are reported inside that value; anything surfaced as
//! [`ToolError`] is turned into an error result by the tool node.

mod course_plan;
mod document;
mod profile;
mod roadmap;
mod suggestions;
mod weather;

pub use course_plan::{GenerateCoursePlanTool, SaveCoursePlanTool};
pub use document::{CreateDocumentTool, UpdateDocumentTool};
pub use profile::UserProfileTool;
pub use roadmap::CreateRoadmapTool;
pub use suggestions::RequestSuggestionsTool;
pub use weather::{WeatherTool, DEFAULT_WEATHER_API};

use std::sync::Arc;

use amigo_llm::{ChatClient, ImageClient};
use amigo_persist::{PersistError, PersistenceClient, ProfileCache};
use amigo_types::GraphConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::data_stream::{DataStreamWriter, StreamClosed};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Model call failed: {0}")]
    Upstream(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Stream(#[from] StreamClosed),
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        Self::Upstream(format!("{:#}", err))
    }
}

/// Long-lived dependencies shared by every turn
pub struct ToolServices {
    pub chat_client: Arc<dyn ChatClient>,
    pub image_client: Option<Arc<dyn ImageClient>>,
    pub image_model: String,
    pub persistence: Arc<dyn PersistenceClient>,
    pub profile_cache: Option<Arc<dyn ProfileCache>>,
    pub config: GraphConfig,
}

/// What a tool sees of the turn it runs in
pub struct ToolContext {
    pub chat_id: String,
    pub user_id: Option<String>,
    /// Model identifier of the turn, reused for nested generations
    pub model: String,
    pub writer: DataStreamWriter,
    pub services: Arc<ToolServices>,
}

impl ToolContext {
    pub fn chat_client(&self) -> &dyn ChatClient {
        self.services.chat_client.as_ref()
    }

    pub fn persistence(&self) -> &dyn PersistenceClient {
        self.services.persistence.as_ref()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.services.config
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    /// Definition advertised to the model
    fn definition(&self) -> amigo_llm::Tool;

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError>;
}

/// Decode tool arguments into their typed form
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tool the assistant ships with
    pub fn standard(weather: WeatherTool) -> Self {
        Self::new()
            .with(weather)
            .with(CreateDocumentTool)
            .with(UpdateDocumentTool)
            .with(RequestSuggestionsTool)
            .with(CreateRoadmapTool)
            .with(UserProfileTool)
            .with(GenerateCoursePlanTool)
            .with(SaveCoursePlanTool)
    }

    /// Add a tool, replacing any registered under the same name
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn definitions(&self) -> Vec<amigo_llm::Tool> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_names() {
        let registry = ToolRegistry::standard(WeatherTool::default());
        assert_eq!(
            registry.names(),
            vec![
                "getWeather",
                "createDocument",
                "updateDocument",
                "requestSuggestions",
                "createRoadmap",
                "userProfileGeneration",
                "generateInitialCoursePlan",
                "saveCoursePlan",
            ]
        );
        assert!(registry.definitions().iter().all(|d| d.function.parameters["type"] == "object"));
    }

    #[test]
    fn test_registering_same_name_replaces() {
        let registry = ToolRegistry::new()
            .with(WeatherTool::default())
            .with(WeatherTool::new(reqwest::Client::new(), "http://localhost:1"));
        assert_eq!(registry.names().len(), 1);
    }
}
