#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;

use vibefinder_api::api::AppState;
use vibefinder_api::db::InMemoryRecommendationRepository;
use vibefinder_api::error::{ProviderError, ProviderResult};
use vibefinder_api::models::{
    Coordinates, GeneratedRecommendation, PlaceDetail, PlaceGeometry, PlaceRecord, Recommendation,
    SentimentBreakdown, TrendingPost, VenueRecord, VideoSummary,
};
use vibefinder_api::services::providers::{
    PlacesProvider, RecommendationGenerator, TrendProvider, VideoAnalysisProvider,
};
use vibefinder_api::services::{Aggregator, InMemoryUserStore, Ranker};

pub const SF: Coordinates = Coordinates {
    lat: 37.7749,
    lng: -122.4194,
};

// ============================================================================
// Canned providers
// ============================================================================

#[derive(Default)]
pub struct FakeTrendProvider {
    pub posts: Vec<TrendingPost>,
    pub venues: Vec<VenueRecord>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl TrendProvider for FakeTrendProvider {
    async fn trending_content(
        &self,
        _center: Coordinates,
        limit: usize,
    ) -> ProviderResult<Vec<TrendingPost>> {
        if self.fail {
            return Err(ProviderError::Unavailable("trend provider offline".to_string()));
        }
        Ok(self.posts.iter().take(limit).cloned().collect())
    }

    async fn trending_venues(
        &self,
        _center: Coordinates,
        limit: usize,
    ) -> ProviderResult<Vec<VenueRecord>> {
        if self.fail {
            return Err(ProviderError::Unavailable("trend provider offline".to_string()));
        }
        Ok(self.venues.iter().take(limit).cloned().collect())
    }
}

pub struct FakePlacesProvider {
    pub coords: Option<Coordinates>,
    pub places: Vec<PlaceRecord>,
    pub fail: bool,
}

impl Default for FakePlacesProvider {
    fn default() -> Self {
        Self {
            coords: Some(SF),
            places: Vec::new(),
            fail: false,
        }
    }
}

#[async_trait::async_trait]
impl PlacesProvider for FakePlacesProvider {
    async fn geocode(&self, query: &str) -> ProviderResult<Option<Coordinates>> {
        if self.fail {
            return Err(ProviderError::Geocode(query.to_string()));
        }
        Ok(self.coords)
    }

    async fn search_nearby(
        &self,
        _center: Coordinates,
        _radius_m: u32,
    ) -> ProviderResult<Vec<PlaceRecord>> {
        if self.fail {
            return Err(ProviderError::Unavailable("places provider offline".to_string()));
        }
        Ok(self.places.clone())
    }

    async fn place_details(&self, _place_id: &str) -> ProviderResult<Option<PlaceDetail>> {
        if self.fail {
            return Err(ProviderError::Unavailable("places provider offline".to_string()));
        }
        Ok(None)
    }
}

#[derive(Default)]
pub struct FakeVideoProvider {
    pub fail: bool,
}

#[async_trait::async_trait]
impl VideoAnalysisProvider for FakeVideoProvider {
    async fn summarize(&self, _video_url: &str) -> ProviderResult<VideoSummary> {
        if self.fail {
            return Err(ProviderError::Unavailable("analysis offline".to_string()));
        }
        Ok(VideoSummary {
            summary: "Lively rooftop crowd at sunset".to_string(),
            duration: 30,
            language: "en".to_string(),
        })
    }

    async fn sentiment(&self, _video_url: &str) -> ProviderResult<SentimentBreakdown> {
        if self.fail {
            return Err(ProviderError::Unavailable("analysis offline".to_string()));
        }
        Ok(SentimentBreakdown {
            positive: 80,
            neutral: 15,
            negative: 5,
        })
    }

    async fn keywords(&self, _video_url: &str) -> ProviderResult<Vec<String>> {
        if self.fail {
            return Err(ProviderError::Unavailable("analysis offline".to_string()));
        }
        Ok(vec!["rooftop".to_string(), "cocktails".to_string()])
    }
}

#[derive(Default)]
pub struct FakeGenerator {
    pub generated: Vec<GeneratedRecommendation>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl RecommendationGenerator for FakeGenerator {
    async fn generate(
        &self,
        _location: &str,
        _preferences: &[String],
    ) -> ProviderResult<Vec<GeneratedRecommendation>> {
        if self.fail {
            return Err(ProviderError::MalformedResponse("not json".to_string()));
        }
        Ok(self.generated.clone())
    }
}

// ============================================================================
// Record builders
// ============================================================================

pub fn stored_rec(id: &str, score: u8, tags: &[&str]) -> Recommendation {
    Recommendation {
        id: id.to_string(),
        title: format!("title-{id}"),
        description: String::new(),
        venue_name: format!("venue-{id}"),
        location: SF,
        social_media_url: String::new(),
        image_url: String::new(),
        video_url: String::new(),
        trend_score: score,
        vibe_tags: tags.iter().map(|t| t.to_string()).collect(),
        timestamp: Utc::now(),
    }
}

pub fn venue(id: &str, video_url: &str, tags: &[&str]) -> VenueRecord {
    VenueRecord {
        id: id.to_string(),
        name: format!("venue-{id}"),
        title: String::new(),
        description: "A trending spot".to_string(),
        address: "123 Main St".to_string(),
        latitude: SF.lat,
        longitude: SF.lng,
        social_url: String::new(),
        video_url: video_url.to_string(),
        image_url: String::new(),
        trend_score: 80,
        categories: tags.iter().map(|t| t.to_string()).collect(),
        engagement: None,
    }
}

pub fn place(id: &str, name: &str, types: &[&str]) -> PlaceRecord {
    PlaceRecord {
        place_id: id.to_string(),
        name: name.to_string(),
        vicinity: "456 Market St".to_string(),
        geometry: PlaceGeometry { location: SF },
        types: types.iter().map(|t| t.to_string()).collect(),
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct TestPipeline {
    pub repository: Arc<InMemoryRecommendationRepository>,
    pub trends: Arc<FakeTrendProvider>,
    pub places: Arc<FakePlacesProvider>,
    pub video: Arc<FakeVideoProvider>,
    pub generator: Arc<FakeGenerator>,
    pub jitter: f64,
}

impl Default for TestPipeline {
    fn default() -> Self {
        Self {
            repository: Arc::new(InMemoryRecommendationRepository::new()),
            trends: Arc::new(FakeTrendProvider::default()),
            places: Arc::new(FakePlacesProvider::default()),
            video: Arc::new(FakeVideoProvider::default()),
            generator: Arc::new(FakeGenerator::default()),
            jitter: 0.0,
        }
    }
}

impl TestPipeline {
    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(
            self.repository.clone(),
            self.trends.clone(),
            self.places.clone(),
            self.video.clone(),
            self.generator.clone(),
            SF,
            5,
        )
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            Arc::new(self.aggregator()),
            Arc::new(Ranker::new(self.jitter)),
            self.trends.clone(),
            Arc::new(InMemoryUserStore::new()),
            SF,
        )
    }
}
