use ironpath::{
    AppState, create_app,
    db::{Store, StoreProvider, seed},
    llm::{CompletionFactory, Provider},
    utils::Config,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ironpath=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let provider = StoreProvider::from_path(config.database.path.as_deref());
    match &provider {
        StoreProvider::Local { path } => tracing::info!(path, "opening local database"),
        StoreProvider::Memory => tracing::info!("no DATABASE_PATH set, using in-memory database"),
    }
    let store = provider.create_store().await?;
    if seed::seed_if_empty(&store).await? {
        tracing::info!("seeded methodology and exercise reference data");
    }
    let store: Arc<dyn Store> = Arc::new(store);

    let provider = Provider::Gemini {
        api_key: config.gemini.api_key.clone(),
        base_url: config.gemini.base_url.clone(),
        model: config.gemini.model.clone(),
        timeout: Duration::from_secs(config.gemini.timeout_secs),
    };
    let llm = Arc::new(CompletionFactory::new(provider));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config: Arc::new(config),
        store,
        llm,
    };

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "ironpath server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
