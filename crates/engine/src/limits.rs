//! Feature-limit gate — maps subscription tiers to quotas and checks usage against them.
//!
//! The tier table is a compile-time constant; every function here is pure.
//! Usage counters are owned by the caller, the gate only reads them.

use serde::Serialize;

use whale_common::types::{Feature, FeatureLimits, Quota, SubscriptionTier};

const FREE_LIMITS: FeatureLimits = FeatureLimits {
    reports: Quota::Limited(1),
    wallets: Quota::Limited(1),
    alerts: Quota::Limited(0),
    ai_insights: Quota::Limited(0),
};

const BASIC_LIMITS: FeatureLimits = FeatureLimits {
    reports: Quota::Limited(5),
    wallets: Quota::Limited(3),
    alerts: Quota::Limited(5),
    ai_insights: Quota::Limited(0),
};

const PRO_LIMITS: FeatureLimits = FeatureLimits {
    reports: Quota::Unlimited,
    wallets: Quota::Unlimited,
    alerts: Quota::Unlimited,
    ai_insights: Quota::Limited(10),
};

const PREMIUM_LIMITS: FeatureLimits = FeatureLimits {
    reports: Quota::Unlimited,
    wallets: Quota::Unlimited,
    alerts: Quota::Unlimited,
    ai_insights: Quota::Unlimited,
};

/// Outcome of an access check, carrying enough context for an upgrade prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub tier: SubscriptionTier,
    pub feature: Feature,
    pub usage: u64,
    pub allowed: bool,
    pub limit: Quota,
}

/// Look up the quotas for a tier.
pub const fn limits_for(tier: SubscriptionTier) -> FeatureLimits {
    match tier {
        SubscriptionTier::Free => FREE_LIMITS,
        SubscriptionTier::Basic => BASIC_LIMITS,
        SubscriptionTier::Pro => PRO_LIMITS,
        SubscriptionTier::Premium => PREMIUM_LIMITS,
    }
}

/// Parse a tier name, coercing anything unrecognized to `FREE`.
pub fn tier_or_free(name: &str) -> SubscriptionTier {
    match name.parse() {
        Ok(tier) => tier,
        Err(_) => {
            tracing::warn!(tier = %name, "Unrecognized subscription tier, falling back to FREE");
            SubscriptionTier::Free
        }
    }
}

/// Lossy variant of [`limits_for`] for tier names coming from outside the process.
pub fn limits_for_name(name: &str) -> FeatureLimits {
    limits_for(tier_or_free(name))
}

/// Decide whether one more use of `feature` is permitted after `usage` prior uses.
///
/// Denied iff `usage >= limit`; unlimited quotas always allow.
pub fn check_access(tier: SubscriptionTier, feature: Feature, usage: u64) -> AccessDecision {
    let limit = limits_for(tier).get(feature);
    let allowed = limit.permits(usage);

    if !allowed {
        tracing::debug!(
            tier = %tier,
            feature = %feature,
            usage,
            limit = %limit,
            "Feature usage at capacity"
        );
    }

    AccessDecision {
        tier,
        feature,
        usage,
        allowed,
        limit,
    }
}

/// Lossy variant of [`check_access`] for tier names coming from outside the process.
pub fn check_access_by_name(tier: &str, feature: Feature, usage: u64) -> AccessDecision {
    check_access(tier_or_free(tier), feature, usage)
}

/// Whether the tier grants the feature at all (a zero quota means it does not).
pub fn is_feature_available(tier: SubscriptionTier, feature: Feature) -> bool {
    limits_for(tier).get(feature) != Quota::Limited(0)
}
