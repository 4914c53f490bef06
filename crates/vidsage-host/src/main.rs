use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidsage_client::{BackendGateway, Dispatcher};
use vidsage_host::{build_router, config::Config, state::AppState};
use vidsage_store::Storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting vidsage host");

    let mut storage = Storage::builder();
    if config.storage.in_memory {
        tracing::warn!("Using in-memory storage, settings will not survive a restart");
        storage = storage.in_memory();
    } else {
        tracing::info!(data_dir = %config.storage.data_dir.display(), "Opening settings store");
        storage = storage.data_dir(&config.storage.data_dir);
    }
    let storage = storage.build().await?;

    if storage.install_defaults(config.backend.default_url()).await? {
        tracing::info!("First start, default settings installed");
    }
    let backend_url = storage.backend_url().await?;
    if !backend_url.is_configured() {
        tracing::warn!("Backend URL not configured; set BACKEND_URL or send saveBackendUrl");
    }

    let gateway = BackendGateway::builder()
        .storage(storage)
        .config(config.backend.gateway())
        .build()?;

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, Dispatcher::from_gateway(gateway)));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);
    tracing::info!(backend = %backend_url, "Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
