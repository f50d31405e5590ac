//! Portfolio provider client and response translation.
//!
//! `PortfolioClient` holds the provider credential and performs a single
//! upstream call per invocation (no cache, no retry). `translate_positions`
//! is the only code that knows the provider's position schema.

use std::time::Duration;

use chrono::Utc;
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;

use whale_common::config::AppConfig;
use whale_common::error::AppError;
use whale_common::types::{Portfolio, TokenBalance};

/// HTTP client for the third-party portfolio provider.
#[derive(Debug, Clone)]
pub struct PortfolioClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PortfolioClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.portfolio_api_url.clone(),
            config.portfolio_api_key.clone(),
            Duration::from_secs(config.upstream_timeout_secs),
        )
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// `{base}/v1/wallets/{address}/positions`, with the address as one encoded segment.
    fn positions_url(&self, address: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("Invalid portfolio API URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("Portfolio API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v1", "wallets", address, "positions"]);
        Ok(url)
    }

    /// Fetch the raw positions document for `address`.
    ///
    /// The upstream JSON body is returned unmodified. Non-success statuses are
    /// returned as [`AppError::Upstream`] carrying the upstream status and body.
    pub async fn fetch_positions(&self, address: &str) -> Result<Value, AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            tracing::error!("Portfolio API key is not configured");
            AppError::Config("API key is not configured".to_string())
        })?;

        let url = self.positions_url(address)?;
        tracing::debug!(address, "Requesting positions from portfolio provider");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Basic {}", api_key))
            .send()
            .await
            .inspect_err(|e| {
                tracing::error!(address, error = %e, "Portfolio provider unreachable");
            })?;

        let status = response.status();
        if !status.is_success() {
            let details = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(address, error = %e, "Failed to read provider error body");
                    String::new()
                }
            };
            tracing::warn!(
                address,
                status = status.as_u16(),
                body = %details,
                "Portfolio provider returned an error"
            );
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: format!(
                    "API request failed: {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
                details,
            });
        }

        let body: Value = response
            .json()
            .await
            .inspect_err(|e| tracing::error!(address, error = %e, "Invalid provider response"))?;

        let positions = body.get("data").and_then(Value::as_array).map_or(0, Vec::len);
        tracing::info!(address, positions, "Portfolio provider call succeeded");
        Ok(body)
    }

    /// Fetch and translate the portfolio for `address`.
    pub async fn fetch_portfolio(&self, address: &str) -> Result<Portfolio, AppError> {
        let body = self.fetch_positions(address).await?;
        translate_positions(&body)
    }
}

/// Convert a provider positions document into a [`Portfolio`].
///
/// Expects `{"data": [{"attributes": {...}}, ...]}`. Positions without a
/// usable quantity are skipped.
pub fn translate_positions(body: &Value) -> Result<Portfolio, AppError> {
    let positions = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::Decode("response has no 'data' array".to_string()))?;

    let mut tokens = Vec::with_capacity(positions.len());
    for position in positions {
        match translate_position(position) {
            Some(token) => tokens.push(token),
            None => {
                let id = position.get("id").and_then(Value::as_str).unwrap_or("?");
                tracing::debug!(id, "Skipping position without symbol or quantity");
            }
        }
    }

    let total_value = tokens.iter().map(|t| t.value).sum();
    Ok(Portfolio {
        total_value,
        tokens,
        fetched_at: Utc::now(),
    })
}

fn translate_position(position: &Value) -> Option<TokenBalance> {
    let attributes = position.get("attributes")?;

    let symbol = attributes
        .get("symbol")
        .or_else(|| attributes.pointer("/fungible_info/symbol"))
        .and_then(Value::as_str)?
        .to_string();
    let name = attributes
        .get("name")
        .or_else(|| attributes.pointer("/fungible_info/name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let quantity = attributes.get("quantity").and_then(number_of)?;
    let price = attributes.get("price").and_then(number_of);

    Some(TokenBalance::new(symbol, name, quantity, price))
}

/// Read a number that the provider may encode as a number, a numeric string,
/// or an object carrying `float`, `numeric` or `value`.
fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => ["float", "numeric", "value"]
            .iter()
            .find_map(|key| map.get(*key).and_then(number_of)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_translate_mixed_shapes() {
        let body = json!({
            "data": [
                {
                    "type": "positions",
                    "id": "eth-pos",
                    "attributes": {
                        "symbol": "ETH",
                        "name": "Ethereum",
                        "quantity": "2.5",
                        "price": 2000.0
                    }
                },
                {
                    "type": "positions",
                    "id": "usdc-pos",
                    "attributes": {
                        "name": "USD Coin",
                        "quantity": {"int": "100000000", "decimals": 6, "float": 100.0, "numeric": "100"},
                        "price": {"value": 1.0},
                        "fungible_info": {"symbol": "USDC", "name": "USD Coin"}
                    }
                },
                {
                    "type": "positions",
                    "id": "unpriced",
                    "attributes": {"symbol": "MEME", "name": "Meme", "quantity": 1000}
                }
            ]
        });

        let portfolio = translate_positions(&body).unwrap();
        assert_eq!(portfolio.tokens.len(), 3);
        assert_eq!(portfolio.tokens[0].value, 5000.0);
        assert_eq!(portfolio.tokens[1].symbol, "USDC");
        assert_eq!(portfolio.tokens[1].quantity, 100.0);
        assert_eq!(portfolio.tokens[2].price, None);
        assert_eq!(portfolio.tokens[2].value, 0.0);
        assert_eq!(portfolio.total_value, 5100.0);
    }

    #[test]
    fn test_translate_skips_unusable_positions() {
        let body = json!({
            "data": [
                {"id": "no-attrs"},
                {"id": "no-qty", "attributes": {"symbol": "BTC"}},
                {"id": "bad-qty", "attributes": {"symbol": "BTC", "quantity": "lots"}},
                {"id": "ok", "attributes": {"symbol": "BTC", "quantity": 0.5, "price": 60000}}
            ]
        });
        let portfolio = translate_positions(&body).unwrap();
        assert_eq!(portfolio.tokens.len(), 1);
        assert_eq!(portfolio.total_value, 30000.0);
    }

    #[test]
    fn test_translate_requires_data_array() {
        assert!(matches!(
            translate_positions(&json!({"errors": []})),
            Err(AppError::Decode(_))
        ));
        let empty = translate_positions(&json!({"data": []})).unwrap();
        assert!(empty.tokens.is_empty());
        assert_eq!(empty.total_value, 0.0);
    }

    #[test]
    fn test_positions_url_encodes_address() {
        let client =
            PortfolioClient::new("https://api.example.com/", None, Duration::from_secs(1)).unwrap();
        let url = client.positions_url("0xabc").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/wallets/0xabc/positions"
        );
        let url = client.positions_url("a/b?c").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/wallets/a%2Fb%3Fc/positions"
        );
    }

    #[tokio::test]
    async fn test_missing_credential_is_config_error() {
        let client =
            PortfolioClient::new("http://127.0.0.1:9", Some("  ".into()), Duration::from_secs(1))
                .unwrap();
        assert!(!client.has_credential());
        let err = client.fetch_positions("0xabc").await.unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg == "API key is not configured"));
    }
}
