use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use amigo_api::{
    auth::HeaderSessionResolver,
    build_router,
    config::Config,
    state::{AppState, ProviderRuntime},
};
use amigo_graph::{Graph, GraphConfig, ToolRegistry, WeatherTool};
use amigo_llm::{ClientFactory, ImageClient, ProviderConfig};
use amigo_persist::{FileProfileCache, MongoPersistenceClient, PersistenceClient, ProfileCache};
use amigo_types::ModelProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Learner's Amigo API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    tracing::info!("Connecting to MongoDB");
    let persist: Arc<dyn PersistenceClient> =
        Arc::new(MongoPersistenceClient::connect(&config.mongodb_uri, &config.mongodb.database).await?);
    tracing::info!("MongoDB connected");

    let profile_cache: Arc<dyn ProfileCache> = Arc::new(FileProfileCache::new(config.profile_cache.dir.clone()));

    let image_client: Option<Arc<dyn ImageClient>> = match &config.openai_api_key {
        Some(key) => Some(ClientFactory::create_image_client(ProviderConfig::openai(key))?),
        None => None,
    };

    let graph_config = GraphConfig::from(&config.llm);
    let weather = WeatherTool::new(reqwest::Client::new(), config.tools.weather_base_url.clone());

    let providers = [
        (ModelProvider::OpenAI, config.openai_api_key.clone().map(ProviderConfig::openai)),
        (ModelProvider::Google, config.google_api_key.clone().map(ProviderConfig::google)),
    ];

    let sessions = Arc::new(HeaderSessionResolver::new(&config.auth.user_header)?);
    let mut state = AppState::new(config.clone(), Arc::clone(&persist), sessions);

    for (provider, provider_config) in providers {
        let Some(provider_config) = provider_config else {
            tracing::warn!("No API key for {:?}, its models are unavailable", provider);
            continue;
        };

        let chat_client = ClientFactory::create_chat_client(provider_config)?;
        let mut builder = Graph::builder()
            .chat_client(Arc::clone(&chat_client))
            .persistence(Arc::clone(&persist))
            .profile_cache(Arc::clone(&profile_cache))
            .tools(ToolRegistry::standard(weather.clone()))
            .config(graph_config.clone());
        if let Some(image_client) = &image_client {
            builder = builder.image_client(Arc::clone(image_client), config.llm.image_model.clone());
        }

        tracing::info!("Initialized {:?} chat client", provider);
        state = state.with_runtime(
            provider,
            ProviderRuntime {
                chat_client,
                graph: Arc::new(builder.build()?),
            },
        );
    }

    let app = build_router(Arc::new(state));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        }
        _ => {
            registry.with(tracing_subscriber::fmt::layer().pretty()).init();
        }
    }
}
