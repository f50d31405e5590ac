//! Feature-limit routes.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use whale_common::error::AppError;
use whale_common::types::{Feature, FeatureLimits, SubscriptionTier};
use whale_engine::limits::{AccessDecision, check_access, limits_for, tier_or_free};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/features/{tier}", get(tier_limits))
        .route("/api/features/{tier}/{feature}", get(feature_access))
}

#[derive(Debug, Serialize)]
pub struct TierLimitsResponse {
    pub tier: SubscriptionTier,
    pub limits: FeatureLimits,
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    #[serde(default)]
    pub usage: u64,
}

/// GET /api/features/:tier — Quotas for a tier. Unknown tiers resolve to FREE.
async fn tier_limits(Path(tier): Path<String>) -> Json<TierLimitsResponse> {
    let tier = tier_or_free(&tier);
    Json(TierLimitsResponse {
        tier,
        limits: limits_for(tier),
    })
}

/// GET /api/features/:tier/:feature?usage=N — Whether one more use is permitted.
async fn feature_access(
    Path((tier, feature)): Path<(String, String)>,
    query: Result<Query<UsageQuery>, QueryRejection>,
) -> Result<Json<AccessDecision>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let feature: Feature = feature.parse().map_err(AppError::Validation)?;
    Ok(Json(check_access(tier_or_free(&tier), feature, query.usage)))
}
