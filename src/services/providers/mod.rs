use std::future::Future;
use std::time::Duration;

/// External data provider abstractions
///
/// Each trait is one outbound concern: social trends, places/geocoding, video
/// analysis, AI generation. Adapters make a single attempt per call and report
/// failures explicitly; no adapter retries, and the aggregator owns all
/// degradation policy.
use crate::{
    error::{ProviderError, ProviderResult},
    models::{
        Coordinates, GeneratedRecommendation, PlaceDetail, PlaceRecord, SentimentBreakdown,
        TrendingPost, VenueRecord, VideoSummary,
    },
};

pub mod ensemble;
pub mod google_maps;
pub mod openrouter;
pub mod socialkit;

pub use ensemble::EnsembleProvider;
pub use google_maps::GoogleMapsProvider;
pub use openrouter::OpenRouterGenerator;
pub use socialkit::SocialKitProvider;

/// Social trend provider: trending posts and venues near a coordinate
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TrendProvider: Send + Sync {
    async fn trending_content(
        &self,
        center: Coordinates,
        limit: usize,
    ) -> ProviderResult<Vec<TrendingPost>>;

    async fn trending_venues(
        &self,
        center: Coordinates,
        limit: usize,
    ) -> ProviderResult<Vec<VenueRecord>>;
}

/// Geocoding and place lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Resolves a free-text location to coordinates; `Ok(None)` means the
    /// provider answered but found nothing
    async fn geocode(&self, query: &str) -> ProviderResult<Option<Coordinates>>;

    async fn search_nearby(
        &self,
        center: Coordinates,
        radius_m: u32,
    ) -> ProviderResult<Vec<PlaceRecord>>;

    async fn place_details(&self, place_id: &str) -> ProviderResult<Option<PlaceDetail>>;
}

/// Per-video analysis calls, issued concurrently by the aggregator
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VideoAnalysisProvider: Send + Sync {
    async fn summarize(&self, video_url: &str) -> ProviderResult<VideoSummary>;

    async fn sentiment(&self, video_url: &str) -> ProviderResult<SentimentBreakdown>;

    async fn keywords(&self, video_url: &str) -> ProviderResult<Vec<String>>;
}

/// AI text generator producing recommendation-shaped JSON
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationGenerator: Send + Sync {
    async fn generate(
        &self,
        location: &str,
        preferences: &[String],
    ) -> ProviderResult<Vec<GeneratedRecommendation>>;
}

/// Bounds a provider call to the configured budget.
///
/// A call that outlives the budget degrades exactly like a failed one.
pub(crate) async fn with_timeout<T, F>(budget: Duration, fut: F) -> ProviderResult<T>
where
    F: Future<Output = ProviderResult<T>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Unavailable(format!(
            "provider call exceeded {}s budget",
            budget.as_secs()
        ))),
    }
}
