use std::sync::Arc;

use amigo_llm::{ChatClient, ImageClient};
use amigo_persist::{PersistenceClient, ProfileCache};
use amigo_types::GraphConfig;
use anyhow::{anyhow, Result};

use crate::graph::Graph;
use crate::tools::{ToolRegistry, ToolServices, WeatherTool};

pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Builder for constructing a Graph with optional components
pub struct GraphBuilder {
    chat_client: Option<Arc<dyn ChatClient>>,
    image_client: Option<Arc<dyn ImageClient>>,
    image_model: String,
    persistence: Option<Arc<dyn PersistenceClient>>,
    profile_cache: Option<Arc<dyn ProfileCache>>,
    tools: Option<ToolRegistry>,
    config: GraphConfig,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            chat_client: None,
            image_client: None,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            persistence: None,
            profile_cache: None,
            tools: None,
            config: GraphConfig::default(),
        }
    }

    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.chat_client = Some(client);
        self
    }

    pub fn image_client(mut self, client: Arc<dyn ImageClient>, model: impl Into<String>) -> Self {
        self.image_client = Some(client);
        self.image_model = model.into();
        self
    }

    pub fn persistence(mut self, client: Arc<dyn PersistenceClient>) -> Self {
        self.persistence = Some(client);
        self
    }

    pub fn profile_cache(mut self, cache: Arc<dyn ProfileCache>) -> Self {
        self.profile_cache = Some(cache);
        self
    }

    /// Replace the standard tool set
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Graph> {
        let chat_client = self
            .chat_client
            .ok_or_else(|| anyhow!("Chat client is required"))?;
        let persistence = self
            .persistence
            .ok_or_else(|| anyhow!("Persistence client is required"))?;
        let tools = self
            .tools
            .unwrap_or_else(|| ToolRegistry::standard(WeatherTool::default()));

        let services = ToolServices {
            chat_client: Arc::clone(&chat_client),
            image_client: self.image_client,
            image_model: self.image_model,
            persistence,
            profile_cache: self.profile_cache,
            config: self.config.clone(),
        };

        Ok(Graph::new(chat_client, Arc::new(tools), Arc::new(services), self.config))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
