//! Portfolio proxy routes.
//!
//! The browser never sees the provider credential: it calls these routes and
//! the server attaches the key to the upstream request.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use whale_common::error::AppError;
use whale_common::types::Portfolio;
use whale_engine::portfolio::translate_positions;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/portfolio/positions", get(proxy_positions))
        .route("/api/portfolio/summary", get(portfolio_summary))
}

#[derive(Debug, Deserialize)]
pub struct PortfolioQuery {
    pub address: Option<String>,
}

impl PortfolioQuery {
    /// The requested address, or a client error when absent, blank or malformed.
    fn require_address(query: Result<Query<Self>, QueryRejection>) -> Result<String, AppError> {
        let Query(query) =
            query.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        query
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or_else(|| AppError::MissingParameter("Wallet address is required".to_string()))
    }
}

/// GET /api/portfolio/positions?address= — Relay the provider's positions document unchanged.
async fn proxy_positions(
    State(state): State<AppState>,
    query: Result<Query<PortfolioQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let address = PortfolioQuery::require_address(query)?;
    let body = state.portfolio.fetch_positions(&address).await?;
    Ok(Json(body))
}

/// GET /api/portfolio/summary?address= — Fetch positions and return the translated portfolio.
async fn portfolio_summary(
    State(state): State<AppState>,
    query: Result<Query<PortfolioQuery>, QueryRejection>,
) -> Result<Json<Portfolio>, AppError> {
    let address = PortfolioQuery::require_address(query)?;
    let body = state.portfolio.fetch_positions(&address).await?;
    let portfolio = translate_positions(&body)?;
    Ok(Json(portfolio))
}
