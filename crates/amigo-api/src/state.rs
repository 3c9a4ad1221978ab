use std::collections::HashMap;
use std::sync::Arc;

use amigo_graph::Graph;
use amigo_llm::ChatClient;
use amigo_persist::PersistenceClient;
use amigo_types::{ModelCatalog, ModelProvider};

use crate::auth::SessionResolver;
use crate::config::Config;

/// Chat client and turn graph bound to one provider
#[derive(Clone)]
pub struct ProviderRuntime {
    pub chat_client: Arc<dyn ChatClient>,
    pub graph: Arc<Graph>,
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<dyn PersistenceClient>,
    pub sessions: Arc<dyn SessionResolver>,
    pub catalog: ModelCatalog,
    runtimes: HashMap<ModelProvider, ProviderRuntime>,
}

impl AppState {
    pub fn new(
        config: Config,
        persist: Arc<dyn PersistenceClient>,
        sessions: Arc<dyn SessionResolver>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            persist,
            sessions,
            catalog: ModelCatalog::builtin(),
            runtimes: HashMap::new(),
        }
    }

    pub fn with_runtime(mut self, provider: ModelProvider, runtime: ProviderRuntime) -> Self {
        self.runtimes.insert(provider, runtime);
        self
    }

    pub fn runtime(&self, provider: ModelProvider) -> Option<&ProviderRuntime> {
        self.runtimes.get(&provider)
    }
}
