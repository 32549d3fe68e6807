// Office API - Web Server
// Nested REST API with Axum over the SQLite store

use anyhow::Context;
use office_api::api::router::build_router;
use office_api::api::AppState;
use office_api::observability::init_tracing;
use office_api::{ServerConfig, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env_or_yaml().context("load server config")?;

    let store = Store::open(&config.database_path)
        .with_context(|| format!("open database {}", config.database_path.display()))?;
    tracing::info!(path = %config.database_path.display(), "database ready");
    tracing::info!(
        offices = ?config.policy.allowed_offices,
        programs = ?config.policy.allowed_programs,
        approver = config.policy.approver_program,
        "access policy loaded"
    );

    let app = build_router(AppState::new(store, config.policy));

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "office api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;

    Ok(())
}
