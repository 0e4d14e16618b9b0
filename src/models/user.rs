use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed vibe vocabulary users pick preferences from
pub const VIBE_CATEGORIES: [&str; 20] = [
    "Chill",
    "Energetic",
    "Romantic",
    "Adventurous",
    "Cozy",
    "Elegant",
    "Hipster",
    "Trendy",
    "Family-friendly",
    "Artsy",
    "Luxurious",
    "Casual",
    "Retro",
    "Modern",
    "Intimate",
    "Lively",
    "Quirky",
    "Sophisticated",
    "Rustic",
    "Vibrant",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Premium,
}

/// A user profile as stored by the user service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    /// Ordered list of selected vibe tags; length bounded by tier
    pub preferences: Vec<String>,
    /// Saved recommendations, by id reference
    pub saved_recommendations: Vec<String>,
    pub onboarding_complete: bool,
    pub subscription: SubscriptionTier,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a fresh free-tier profile
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            email: String::new(),
            preferences: Vec::new(),
            saved_recommendations: Vec::new(),
            onboarding_complete: false,
            subscription: SubscriptionTier::Free,
            subscription_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_premium(&self) -> bool {
        self.subscription == SubscriptionTier::Premium
    }
}
