use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Model steps per turn (an LLM call plus the tool calls it requested)
    pub max_steps: usize,
    pub max_course_modules: usize,
    pub max_suggestions: usize,
    /// Bounded buffer between the turn task and the HTTP response
    pub channel_capacity: usize,
    pub execution_timeout: Duration,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_steps: 5,
            max_course_modules: 5,
            max_suggestions: 5,
            channel_capacity: 1000,
            execution_timeout: Duration::from_secs(300),
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_max_course_modules(mut self, max: usize) -> Self {
        self.max_course_modules = max;
        self
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub provider: ModelProvider,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LLMConfig {
    pub fn new(model: impl Into<String>, provider: ModelProvider) -> Self {
        Self {
            model: model.into(),
            provider,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

impl From<&ChatModel> for LLMConfig {
    fn from(model: &ChatModel) -> Self {
        Self::new(model.api_identifier.clone(), model.provider)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAI,
    Google,
}

/// A model a client may select by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatModel {
    pub id: String,
    pub label: String,
    pub api_identifier: String,
    pub description: String,
    pub provider: ModelProvider,
}

impl ChatModel {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        api_identifier: impl Into<String>,
        description: impl Into<String>,
        provider: ModelProvider,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            api_identifier: api_identifier.into(),
            description: description.into(),
            provider,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCatalog {
    pub models: Vec<ChatModel>,
    pub default_model_id: String,
}

impl ModelCatalog {
    pub fn builtin() -> Self {
        Self {
            models: vec![
                ChatModel::new(
                    "learners-amigo",
                    "Learner's Amigo",
                    "gemini-2.0-flash",
                    "Course recommendations and learning plans",
                    ModelProvider::Google,
                ),
                ChatModel::new(
                    "gemini-2.0-flash-actual",
                    "Gemini 2.0 Flash",
                    "gemini-2.0-flash",
                    "Fast general-purpose model",
                    ModelProvider::Google,
                ),
                ChatModel::new(
                    "gemini-2.5-pro-experimental",
                    "Gemini 2.5 Pro (Experimental)",
                    "gemini-2.5-pro-exp-03-25",
                    "Slower, stronger reasoning",
                    ModelProvider::Google,
                ),
            ],
            default_model_id: "learners-amigo".to_string(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&ChatModel> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn default_model(&self) -> Option<&ChatModel> {
        self.find(&self.default_model_id)
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = ModelCatalog::builtin();
        let default = catalog.default_model().unwrap();
        assert_eq!(default.id, "learners-amigo");
        assert_eq!(default.api_identifier, "gemini-2.0-flash");
        assert_eq!(default.provider, ModelProvider::Google);
        assert!(catalog.find("gpt-unknown").is_none());
    }

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert_eq!(config.max_steps, 5);
        assert_eq!(config.max_course_modules, 5);
    }
}
