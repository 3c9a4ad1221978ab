use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use amigo_types::GraphConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub mongodb: MongoDbConfig,
    pub llm: LlmConfig,
    pub tools: ToolsConfig,
    pub auth: AuthConfig,
    pub profile_cache: ProfileCacheConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub google_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a whole request, streaming included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub max_steps: usize,
    pub max_course_modules: usize,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    pub turn_timeout_secs: u64,
    pub image_model: String,
}

fn default_max_suggestions() -> usize {
    5
}

impl From<&LlmConfig> for GraphConfig {
    fn from(config: &LlmConfig) -> Self {
        GraphConfig::default()
            .with_max_steps(config.max_steps)
            .with_max_course_modules(config.max_course_modules)
            .with_max_suggestions(config.max_suggestions)
            .with_timeout(Duration::from_secs(config.turn_timeout_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    pub weather_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Header a trusted gateway sets to the signed-in user's id
    pub user_header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileCacheConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. `AMIGO_`-prefixed environment variables, `__` between section and key
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // AMIGO_LLM__MAX_STEPS=3 overrides llm.max_steps
            .add_source(
                Environment::with_prefix("AMIGO")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets from ENV (not in TOML)
        cfg.mongodb_uri = std::env::var("MONGODB_URI")
            .map_err(|_| ConfigError::Message("MONGODB_URI environment variable is required".to_string()))?;
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        cfg.google_api_key = std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty());

        if cfg.openai_api_key.is_none() && cfg.google_api_key.is_none() {
            return Err(ConfigError::Message(
                "set OPENAI_API_KEY or GOOGLE_API_KEY".to_string(),
            ));
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }
}
