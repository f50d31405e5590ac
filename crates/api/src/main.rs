//! WhaleWatch API server binary entrypoint.

use std::net::SocketAddr;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use whale_common::config::AppConfig;
use whale_engine::refresh::{RefreshHandle, spawn_refresh};

use whale_api::routes::create_router;
use whale_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("whale_api=debug,whale_engine=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting WhaleWatch API server...");

    // Load configuration
    let config = AppConfig::from_env()?;
    if config.portfolio_api_key.is_none() {
        tracing::warn!("PORTFOLIO_API_KEY not set; portfolio routes will return 500");
    }

    // Build application state
    let state = AppState::new(&config)?;

    // Background refresh for configured addresses
    let period = Duration::from_secs(config.refresh_interval_secs.max(1));
    let refreshers: Vec<RefreshHandle> = config
        .watch_addresses
        .iter()
        .map(|address| spawn_refresh(state.portfolio.clone(), address.clone(), period))
        .collect();
    for handle in &refreshers {
        let mut updates = handle.subscribe();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                if let Some(snapshot) = snapshot
                    && let Ok(portfolio) = &snapshot.result
                {
                    tracing::info!(
                        address = %snapshot.address,
                        tokens = portfolio.tokens.len(),
                        total_value = portfolio.total_value,
                        "Portfolio refreshed"
                    );
                }
            }
        });
    }

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .map_err(|_| anyhow::anyhow!("API_BIND_ADDR must be a socket address"))?;
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received shutdown signal, stopping gracefully...");
        })
        .await?;

    for handle in refreshers {
        handle.stop().await;
    }

    tracing::info!("WhaleWatch API server stopped.");
    Ok(())
}
