//! Subscription lifecycle — signup, plan changes, cancellation and expiry.
//!
//! Subscriptions are never deleted. Anything not currently active gates as FREE.

use chrono::{DateTime, Utc};

use whale_common::types::{Subscription, SubscriptionStatus, SubscriptionTier};

/// Lifecycle operations on a [`Subscription`] record.
pub trait SubscriptionLifecycle {
    /// A fresh FREE/active subscription created at signup.
    fn signup(now: DateTime<Utc>) -> Self;

    /// Move to a new plan, restarting the billing period.
    fn change_plan(
        &mut self,
        tier: SubscriptionTier,
        now: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    );

    fn cancel(&mut self, now: DateTime<Utc>);

    /// Mark the subscription inactive if its end date has passed.
    /// Returns `true` when the status changed.
    fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool;

    /// Tier used for feature gating at `now`.
    fn effective_tier(&self, now: DateTime<Utc>) -> SubscriptionTier;
}

impl SubscriptionLifecycle for Subscription {
    fn signup(now: DateTime<Utc>) -> Self {
        Subscription {
            tier: SubscriptionTier::Free,
            status: SubscriptionStatus::Active,
            started_at: Some(now),
            ends_at: None,
        }
    }

    fn change_plan(
        &mut self,
        tier: SubscriptionTier,
        now: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    ) {
        tracing::info!(from = %self.tier, to = %tier, "Subscription plan changed");
        self.tier = tier;
        self.status = SubscriptionStatus::Active;
        self.started_at = Some(now);
        self.ends_at = ends_at;
    }

    fn cancel(&mut self, now: DateTime<Utc>) {
        tracing::info!(tier = %self.tier, "Subscription cancelled");
        self.status = SubscriptionStatus::Cancelled;
        self.ends_at = Some(self.ends_at.map_or(now, |end| end.min(now)));
    }

    fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.ends_at {
            Some(end) if self.status == SubscriptionStatus::Active && end <= now => {
                tracing::info!(tier = %self.tier, ended_at = %end, "Subscription expired");
                self.status = SubscriptionStatus::Inactive;
                true
            }
            _ => false,
        }
    }

    fn effective_tier(&self, now: DateTime<Utc>) -> SubscriptionTier {
        let expired = self.ends_at.is_some_and(|end| end <= now);
        if self.status == SubscriptionStatus::Active && !expired {
            self.tier
        } else {
            SubscriptionTier::Free
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_signup_defaults_to_free_active() {
        let now = Utc::now();
        let sub = Subscription::signup(now);
        assert_eq!(sub.tier, SubscriptionTier::Free);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.started_at, Some(now));
        assert_eq!(sub.effective_tier(now), SubscriptionTier::Free);
    }

    #[test]
    fn test_upgrade_then_expire() {
        let now = Utc::now();
        let mut sub = Subscription::signup(now);
        sub.change_plan(SubscriptionTier::Pro, now, Some(now + Duration::days(30)));
        assert_eq!(sub.effective_tier(now + Duration::days(1)), SubscriptionTier::Pro);

        let later = now + Duration::days(31);
        assert_eq!(sub.effective_tier(later), SubscriptionTier::Free);
        assert!(sub.expire_if_due(later));
        assert_eq!(sub.status, SubscriptionStatus::Inactive);
        assert!(!sub.expire_if_due(later));
    }

    #[test]
    fn test_open_ended_plan_never_expires() {
        let now = Utc::now();
        let mut sub = Subscription::signup(now);
        sub.change_plan(SubscriptionTier::Basic, now, None);
        assert!(!sub.expire_if_due(now + Duration::days(3650)));
        assert_eq!(
            sub.effective_tier(now + Duration::days(3650)),
            SubscriptionTier::Basic
        );
    }

    #[test]
    fn test_cancel_gates_as_free() {
        let now = Utc::now();
        let mut sub = Subscription::signup(now);
        sub.change_plan(SubscriptionTier::Premium, now, Some(now + Duration::days(30)));
        sub.cancel(now + Duration::days(2));
        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert_eq!(sub.ends_at, Some(now + Duration::days(2)));
        assert_eq!(sub.effective_tier(now + Duration::days(1)), SubscriptionTier::Free);
    }
}
