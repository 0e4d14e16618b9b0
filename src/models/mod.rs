mod recommendation;
mod user;

pub use recommendation::{
    AggregationRequest, Coordinates, EngagementStats, GeneratedRecommendation, PlaceDetail,
    PlaceGeometry, PlaceRecord, ProviderRecord, Recommendation, SentimentBreakdown, TrendingPost,
    VenueRecord, VideoAnalysis, VideoSummary,
};
pub use user::{SubscriptionTier, UserProfile, VIBE_CATEGORIES};
