use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{SubscriptionTier, UserProfile},
};

/// Storage seam for user profiles.
///
/// Mutating operations create the profile on first touch, so a client may
/// start saving preferences before any explicit signup flow runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> AppResult<Option<UserProfile>>;

    async fn update_preferences(
        &self,
        user_id: &str,
        preferences: Vec<String>,
    ) -> AppResult<UserProfile>;

    async fn set_subscription(
        &self,
        user_id: &str,
        tier: SubscriptionTier,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<UserProfile>;

    async fn complete_onboarding(&self, user_id: &str) -> AppResult<UserProfile>;

    /// Returns false when the recommendation was already saved
    async fn save_recommendation(&self, user_id: &str, recommendation_id: &str)
        -> AppResult<bool>;

    async fn saved_recommendations(&self, user_id: &str) -> AppResult<Vec<String>>;
}

/// Process-local user store backed by a guarded map
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify<F>(&self, user_id: &str, apply: F) -> UserProfile
    where
        F: FnOnce(&mut UserProfile),
    {
        let mut users = self.users.write().await;
        let profile = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id));
        apply(profile);
        profile.updated_at = Utc::now();
        profile.clone()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn update_preferences(
        &self,
        user_id: &str,
        preferences: Vec<String>,
    ) -> AppResult<UserProfile> {
        Ok(self
            .modify(user_id, |profile| profile.preferences = preferences)
            .await)
    }

    async fn set_subscription(
        &self,
        user_id: &str,
        tier: SubscriptionTier,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<UserProfile> {
        Ok(self
            .modify(user_id, |profile| {
                profile.subscription = tier;
                profile.subscription_expires_at = expires_at;
            })
            .await)
    }

    async fn complete_onboarding(&self, user_id: &str) -> AppResult<UserProfile> {
        Ok(self
            .modify(user_id, |profile| profile.onboarding_complete = true)
            .await)
    }

    async fn save_recommendation(
        &self,
        user_id: &str,
        recommendation_id: &str,
    ) -> AppResult<bool> {
        let mut inserted = false;
        self.modify(user_id, |profile| {
            if !profile
                .saved_recommendations
                .iter()
                .any(|id| id == recommendation_id)
            {
                profile
                    .saved_recommendations
                    .push(recommendation_id.to_string());
                inserted = true;
            }
        })
        .await;
        Ok(inserted)
    }

    async fn saved_recommendations(&self, user_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .users
            .read()
            .await
            .get(user_id)
            .map(|profile| profile.saved_recommendations.clone())
            .unwrap_or_default())
    }
}
