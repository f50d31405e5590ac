//! Shared application state for the Axum API server.

use whale_common::config::AppConfig;
use whale_common::error::AppError;
use whale_engine::portfolio::PortfolioClient;

/// Application state shared across all route handlers via Axum `State`.
///
/// Immutable once built; handlers share nothing mutable between requests.
#[derive(Clone)]
pub struct AppState {
    pub portfolio: PortfolioClient,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let portfolio = PortfolioClient::from_config(config)?;
        Ok(Self { portfolio })
    }
}
