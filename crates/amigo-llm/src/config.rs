// Provider configuration and client construction

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::OpenAIClient;
use crate::traits::{ChatClient, ImageClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    OpenAI,
    Google,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub api_key: String,
    /// Overrides the provider's default endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ApiKeyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderDetails {
    OpenAI(ApiKeyConfig),
    Google(ApiKeyConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(flatten)]
    pub details: ProviderDetails,
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            details: ProviderDetails::OpenAI(ApiKeyConfig::new(api_key)),
        }
    }

    pub fn google(api_key: impl Into<String>) -> Self {
        Self {
            details: ProviderDetails::Google(ApiKeyConfig::new(api_key)),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        match &mut self.details {
            ProviderDetails::OpenAI(c) | ProviderDetails::Google(c) => {
                c.base_url = Some(base_url.into());
            }
        }
        self
    }

    pub fn provider_type(&self) -> ProviderType {
        match self.details {
            ProviderDetails::OpenAI(_) => ProviderType::OpenAI,
            ProviderDetails::Google(_) => ProviderType::Google,
        }
    }
}

/// Builds concrete clients from [`ProviderConfig`]
pub struct ClientFactory;

impl ClientFactory {
    fn build(config: ProviderConfig) -> Result<OpenAIClient> {
        let client = match config.details {
            ProviderDetails::OpenAI(c) => {
                let client = OpenAIClient::new(c.api_key)?;
                match c.base_url {
                    Some(url) => client.with_base_url(url),
                    None => client,
                }
            }
            ProviderDetails::Google(c) => {
                let client = OpenAIClient::google(c.api_key)?;
                match c.base_url {
                    Some(url) => client.with_base_url(url),
                    None => client,
                }
            }
        };
        Ok(client)
    }

    pub fn create_chat_client(config: ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        Ok(Arc::new(Self::build(config)?))
    }

    /// Only OpenAI serves image generation
    pub fn create_image_client(config: ProviderConfig) -> Result<Arc<dyn ImageClient>> {
        if config.provider_type() != ProviderType::OpenAI {
            anyhow::bail!("Image generation is not supported for {:?}", config.provider_type());
        }
        Ok(Arc::new(Self::build(config)?))
    }
}
