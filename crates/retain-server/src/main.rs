//! retain-server - REST API server binary.

use std::net::SocketAddr;

use retain_core::RetainConfig;
use retain_server::{create_server, create_server_with_auth, ApiKey, AppState};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
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
            Ok(mut sig) => {
                sig.recv().await;
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

/// Load the config file named by `RETAIN_CONFIG` (if any), then apply env overrides.
fn load_config() -> retain_core::RetainResult<RetainConfig> {
    let config = match std::env::var("RETAIN_CONFIG") {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            RetainConfig::from_file(path)?
        }
        Err(_) => RetainConfig::default(),
    };
    config.with_env_overrides()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("retain_server=debug".parse()?),
        )
        .init();

    // Get configuration from environment
    let host = std::env::var("RETAIN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("RETAIN_PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .map_err(|e| format!("RETAIN_PORT must be a valid port number: {}", e))?;
    let require_auth = std::env::var("RETAIN_REQUIRE_AUTH").is_ok();

    let config = load_config()?;
    info!("Using question database {}", config.database_path.display());
    let state = AppState::open(config)?;

    // Create server with or without auth
    let app = if require_auth {
        let key = std::env::var("RETAIN_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or("RETAIN_REQUIRE_AUTH is set but RETAIN_API_KEY is empty")?;
        info!("Authentication enabled");
        create_server_with_auth(state, ApiKey::new(key))
    } else {
        info!("Authentication disabled");
        create_server(state)
    };

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting retain-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped cleanly");
    Ok(())
}
