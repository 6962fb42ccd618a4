use std::net::SocketAddr;
use std::sync::Arc;

use stockroom_mock::{AppState, Config, MemoryStore, build_app, logger};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let _log_guard = logger::init_logger_with_file(&config.log_level, config.log_dir.as_deref());

    let store = if config.seed_demo_data {
        MemoryStore::with_demo_data()
    } else {
        MemoryStore::new()
    };
    let app = build_app(Arc::new(AppState::new(store)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, seeded = config.seed_demo_data, "stockroom-mock listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("stockroom-mock stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
