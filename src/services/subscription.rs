use std::sync::Arc;

use chrono::{Months, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{SubscriptionTier, UserProfile},
    services::users::UserStore,
};

pub const PREMIUM_MONTHLY_PRICE_USD: u32 = 5;

/// Free-tier cap on concurrent vibe filters
pub const FREE_TIER_MAX_PREFERENCES: usize = 3;

const FREE_FEATURES: [&str; 4] = [
    "Basic recommendations",
    "Interactive map view",
    "Up to 3 vibe filters",
    "Save favorite spots",
];

const PREMIUM_FEATURES: [&str; 6] = [
    "All free features",
    "Unlimited vibe filters",
    "Personalized recommendations",
    "Detailed trend insights",
    "Social media analytics",
    "Advanced search options",
];

/// Maximum preference count for a tier; None means unbounded
pub fn max_preferences(tier: SubscriptionTier) -> Option<usize> {
    match tier {
        SubscriptionTier::Free => Some(FREE_TIER_MAX_PREFERENCES),
        SubscriptionTier::Premium => None,
    }
}

/// Truncates a preference list to what the tier allows, keeping order
pub fn clamp_preferences(tier: SubscriptionTier, mut preferences: Vec<String>) -> Vec<String> {
    if let Some(max) = max_preferences(tier) {
        preferences.truncate(max);
    }
    preferences
}

pub fn features(tier: SubscriptionTier) -> &'static [&'static str] {
    match tier {
        SubscriptionTier::Free => &FREE_FEATURES,
        SubscriptionTier::Premium => &PREMIUM_FEATURES,
    }
}

/// Free features are available to everyone, premium features only to premium
/// users, and unknown feature names to no one
pub fn is_feature_available(tier: SubscriptionTier, feature: &str) -> bool {
    if FREE_FEATURES.contains(&feature) {
        return true;
    }
    if PREMIUM_FEATURES.contains(&feature) {
        return tier == SubscriptionTier::Premium;
    }
    false
}

/// Subscription lifecycle over the user store. Payment processing is out of
/// scope; a subscribe call records the tier and a one-month expiry directly.
pub struct SubscriptionManager {
    users: Arc<dyn UserStore>,
}

impl SubscriptionManager {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn subscribe_premium(&self, user_id: &str) -> AppResult<UserProfile> {
        let expires_at = Utc::now()
            .checked_add_months(Months::new(1))
            .ok_or_else(|| AppError::Internal("expiry out of range".to_string()))?;

        let profile = self
            .users
            .set_subscription(user_id, SubscriptionTier::Premium, Some(expires_at))
            .await?;

        tracing::info!(user_id = %user_id, expires_at = %expires_at, "Premium subscription started");
        Ok(profile)
    }

    pub async fn cancel(&self, user_id: &str) -> AppResult<UserProfile> {
        let profile = self
            .users
            .set_subscription(user_id, SubscriptionTier::Free, None)
            .await?;

        tracing::info!(user_id = %user_id, "Subscription canceled");
        Ok(profile)
    }
}
