use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Subscription plan levels, ordered from most to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionTier {
    Free,
    Basic,
    Pro,
    Premium,
}

impl SubscriptionTier {
    pub const ALL: [SubscriptionTier; 4] = [
        SubscriptionTier::Free,
        SubscriptionTier::Basic,
        SubscriptionTier::Pro,
        SubscriptionTier::Premium,
    ];
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionTier::Free => write!(f, "FREE"),
            SubscriptionTier::Basic => write!(f, "BASIC"),
            SubscriptionTier::Pro => write!(f, "PRO"),
            SubscriptionTier::Premium => write!(f, "PREMIUM"),
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FREE" => Ok(SubscriptionTier::Free),
            "BASIC" => Ok(SubscriptionTier::Basic),
            "PRO" => Ok(SubscriptionTier::Pro),
            "PREMIUM" => Ok(SubscriptionTier::Premium),
            _ => Err(format!("Unknown subscription tier '{}'", s)),
        }
    }
}

/// Features whose usage is metered per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Reports,
    Wallets,
    Alerts,
    AiInsights,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Reports,
        Feature::Wallets,
        Feature::Alerts,
        Feature::AiInsights,
    ];
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feature::Reports => write!(f, "reports"),
            Feature::Wallets => write!(f, "wallets"),
            Feature::Alerts => write!(f, "alerts"),
            Feature::AiInsights => write!(f, "aiInsights"),
        }
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reports" => Ok(Feature::Reports),
            "wallets" => Ok(Feature::Wallets),
            "alerts" => Ok(Feature::Alerts),
            "aiInsights" => Ok(Feature::AiInsights),
            _ => Err(format!(
                "Unknown feature '{}'. Valid features: reports, wallets, alerts, aiInsights",
                s
            )),
        }
    }
}

/// Maximum permitted usage count for a feature.
///
/// `Unlimited` is its own variant so it can never be confused with a finite limit.
/// Serializes as a JSON integer or the string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quota {
    Limited(u64),
    Unlimited,
}

impl Quota {
    /// Whether one more use is permitted after `usage` prior uses.
    pub const fn permits(self, usage: u64) -> bool {
        match self {
            Quota::Limited(limit) => usage < limit,
            Quota::Unlimited => true,
        }
    }

    pub const fn is_unlimited(self) -> bool {
        matches!(self, Quota::Unlimited)
    }
}

impl Serialize for Quota {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Quota::Limited(n) => serializer.serialize_u64(*n),
            Quota::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl std::fmt::Display for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quota::Limited(n) => write!(f, "{}", n),
            Quota::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Per-feature quotas for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureLimits {
    pub reports: Quota,
    pub wallets: Quota,
    pub alerts: Quota,
    pub ai_insights: Quota,
}

impl FeatureLimits {
    pub const fn get(&self, feature: Feature) -> Quota {
        match feature {
            Feature::Reports => self.reports,
            Feature::Wallets => self.wallets,
            Feature::Alerts => self.alerts,
            Feature::AiInsights => self.ai_insights,
        }
    }
}

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Cancelled,
}

/// A user's subscription record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Supported address families for tracked wallets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Evm,
    Bitcoin,
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Evm => write!(f, "evm"),
            Chain::Bitcoin => write!(f, "bitcoin"),
        }
    }
}

/// A single token holding derived from a provider position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: f64,
    pub price: Option<f64>,
    /// `quantity * price`, or 0 when the price is unknown.
    pub value: f64,
}

impl TokenBalance {
    pub fn new(symbol: String, name: Option<String>, quantity: f64, price: Option<f64>) -> Self {
        let value = price.map(|p| p * quantity).unwrap_or(0.0);
        Self {
            symbol,
            name,
            quantity,
            price,
            value,
        }
    }
}

/// Translated snapshot of a wallet's holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub total_value: f64,
    pub tokens: Vec<TokenBalance>,
    pub fetched_at: DateTime<Utc>,
}

/// A wallet address tracked by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletEntry {
    pub chain: Chain,
    pub address: String,
    pub alias: Option<String>,
    pub created_at: DateTime<Utc>,
    pub balances: Vec<TokenBalance>,
}
