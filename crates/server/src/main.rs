use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loanport_core::{
    load_config, validate_config, BorrowerBackend, CachedCredentialBroker,
    CognitoCredentialBroker, DocumentSubmitter, HttpBackend, IngestionService, ObjectStore,
    S3ObjectStore, UploadOrchestrator,
};
use loanport_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());

    // JSON lines for log shippers, human-readable otherwise
    if std::env::var("LOANPORT_LOG_JSON").is_ok_and(|v| v == "1" || v == "true") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn run() -> Result<()> {
    init_logging();

    // Determine config path
    let config_path = std::env::var("LOANPORT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let environment = config
        .active_environment()
        .context("No environment configured for the deployment mode")?;
    info!(version = VERSION, mode = config.mode.as_str(), "Configuration loaded successfully");
    info!("Backend: {}", environment.base_url);
    info!(
        "Document storage: bucket {} in {}",
        environment.storage_bucket, environment.storage_region
    );

    // Lending backend
    let backend: Arc<dyn BorrowerBackend> = Arc::new(
        HttpBackend::from_environment(environment).context("Failed to create backend client")?,
    );

    // Storage credentials, cached until shortly before they expire
    let identity = CognitoCredentialBroker::from_environment(environment)
        .context("Failed to create identity client")?;
    let broker = CachedCredentialBroker::new(
        identity,
        chrono::Duration::seconds(config.uploads.credential_refresh_skew_secs as i64),
    );

    let store = S3ObjectStore::from_environment(environment)
        .context("Failed to create storage client")?;
    info!("Uploads go to {}", store.object_url("{key}"));

    let ingestion = IngestionService::new(
        UploadOrchestrator::new(
            Arc::new(broker),
            Arc::new(store),
            config.uploads.max_file_bytes,
        ),
        DocumentSubmitter::new(Arc::clone(&backend)),
    );

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), backend, ingestion));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
