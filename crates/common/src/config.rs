use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Portfolio provider base URL
    pub portfolio_api_url: String,

    /// Portfolio provider credential. Never leaves the server.
    pub portfolio_api_key: Option<String>,

    /// Timeout for a single upstream request in seconds (default: 15)
    pub upstream_timeout_secs: u64,

    /// Socket address the API server binds to
    pub bind_addr: String,

    /// Background portfolio refresh period in seconds (default: 300)
    pub refresh_interval_secs: u64,

    /// Addresses refreshed in the background while the server runs
    pub watch_addresses: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            portfolio_api_url: std::env::var("PORTFOLIO_API_URL")
                .unwrap_or_else(|_| "https://api.zerion.io".to_string()),
            portfolio_api_key: std::env::var("PORTFOLIO_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS must be a valid u64"))?,
            bind_addr: std::env::var("API_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            refresh_interval_secs: std::env::var("PORTFOLIO_REFRESH_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORTFOLIO_REFRESH_SECS must be a valid u64"))?,
            watch_addresses: parse_address_list(
                &std::env::var("WATCH_ADDRESSES").unwrap_or_default(),
            ),
        })
    }
}

fn parse_address_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_list() {
        assert!(parse_address_list("").is_empty());
        assert_eq!(
            parse_address_list(" 0xabc, ,0xdef "),
            vec!["0xabc".to_string(), "0xdef".to_string()]
        );
    }
}
