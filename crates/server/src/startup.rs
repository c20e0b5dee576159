use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use service::VotingApp;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load configuration: `CONFIG_PATH`/`config.toml` when present, defaults
/// plus env overrides otherwise.
fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_or_default().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Log what the ledger looks like at startup. A missing or unreadable ledger
/// does not stop the server; identification reports it per request.
async fn report_ledger(app: &VotingApp) {
    match app.ledger.snapshot().await {
        Ok(voters) if voters.is_empty() => {
            warn!(location = %app.ledger.location(), "voter ledger is empty; register voters before opening polls")
        }
        Ok(voters) => info!(
            location = %app.ledger.location(),
            voters = voters.len(),
            voted = voters.voted_count(),
            "voter ledger loaded"
        ),
        Err(e) => warn!(location = %app.ledger.location(), error = %e, "voter ledger not readable at startup"),
    }
}

/// Wire services and router from configuration.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    common::env::ensure_env(&cfg.frontend.static_dir, &cfg.storage.data_dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;
    let app = VotingApp::from_config(cfg)?;
    report_ledger(&app).await;
    info!(candidates = ?app.voting.candidates().labels(), abstain = app.voting.candidates().abstain(), "ballot configured");
    Ok(routes::build_router(app, build_cors(), &cfg.frontend.static_dir))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received; finishing in-flight requests");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = load_config()?;
    let router = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting voting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
