use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    db::RecommendationRepository,
    error::{AppResult, ProviderResult},
    models::{
        AggregationRequest, Coordinates, PlaceRecord, ProviderRecord, Recommendation, VenueRecord,
        VideoAnalysis,
    },
    services::{
        fallback::fallback_recommendations,
        normalize::normalize,
        providers::{PlacesProvider, RecommendationGenerator, TrendProvider, VideoAnalysisProvider},
    },
};

/// Upper bound on per-request enrichment fan-out
const MAX_ENRICHMENT_BATCH: usize = 5;
const DB_LOOKUP_RADIUS_KM: f64 = 10.0;
const DB_LOOKUP_LIMIT: usize = 20;
const NEARBY_RADIUS_M: u32 = 5_000;

/// Orchestrates one aggregation request across sources in priority order.
///
/// Four stages, each terminal on success: stored recommendations, trending
/// venues with video enrichment, nearby places, AI generation. Every external
/// failure is logged and degrades to the next stage; the public entry point
/// never fails and never returns an empty batch (the static fallback list is
/// the floor).
pub struct Aggregator {
    repository: Arc<dyn RecommendationRepository>,
    trends: Arc<dyn TrendProvider>,
    places: Arc<dyn PlacesProvider>,
    video: Arc<dyn VideoAnalysisProvider>,
    generator: Arc<dyn RecommendationGenerator>,
    fallback_center: Coordinates,
    min_results: usize,
}

impl Aggregator {
    pub fn new(
        repository: Arc<dyn RecommendationRepository>,
        trends: Arc<dyn TrendProvider>,
        places: Arc<dyn PlacesProvider>,
        video: Arc<dyn VideoAnalysisProvider>,
        generator: Arc<dyn RecommendationGenerator>,
        fallback_center: Coordinates,
        min_results: usize,
    ) -> Self {
        Self {
            repository,
            trends,
            places,
            video,
            generator,
            fallback_center,
            min_results,
        }
    }

    /// The sole public pipeline entry point. Always resolves: on any internal
    /// error, or an empty result after every stage, the static fallback list
    /// is returned instead.
    pub async fn get_recommendations(
        &self,
        location: &str,
        preferences: &[String],
    ) -> Vec<Recommendation> {
        let mut request = AggregationRequest::new(location, preferences.to_vec());
        request.min_results = self.min_results;

        match self.aggregate(&request).await {
            Ok(batch) if !batch.is_empty() => batch,
            Ok(_) => {
                tracing::info!(location = %location, "No live results, serving fallback list");
                fallback_recommendations()
            }
            Err(e) => {
                tracing::error!(error = %e, location = %location, "Aggregation failed, serving fallback list");
                fallback_recommendations()
            }
        }
    }

    async fn aggregate(&self, request: &AggregationRequest) -> AppResult<Vec<Recommendation>> {
        let center = self.resolve_coordinates(&request.location_query).await;

        // Stage 1: stored recommendations
        let stored = self.lookup_stored(request, center).await;
        if stored.len() >= request.min_results {
            tracing::debug!(count = stored.len(), "Stored recommendations satisfied request");
            return Ok(dedupe_by_id(stored));
        }

        // Stage 2: trending venues with video enrichment
        let venues = match self
            .trends
            .trending_venues(center, MAX_ENRICHMENT_BATCH)
            .await
        {
            Ok(venues) => venues,
            Err(e) => {
                tracing::warn!(error = %e, "Trending venue fetch failed, trying places");
                Vec::new()
            }
        };

        if !venues.is_empty() {
            let batch = self.enrich_venues(venues).await;
            if !batch.is_empty() {
                let batch = dedupe_by_id(batch);
                self.persist_in_background(&batch);
                return Ok(batch);
            }
            tracing::warn!("Every trending venue failed enrichment, trying places");
        }

        // Stage 3: nearby places
        let places = match self.places.search_nearby(center, NEARBY_RADIUS_M).await {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!(error = %e, "Nearby place search failed");
                Vec::new()
            }
        };

        if !places.is_empty() {
            let batch = self.enrich_places(places).await;
            if !batch.is_empty() {
                let batch = dedupe_by_id(batch);
                self.persist_in_background(&batch);
                return Ok(batch);
            }
        }

        // Stage 4: AI generation
        let batch = self.generate(request).await;
        Ok(dedupe_by_id(batch))
    }

    /// Geocodes the location query, defaulting to the reference coordinate on
    /// any failure or unresolvable input
    async fn resolve_coordinates(&self, query: &str) -> Coordinates {
        match self.places.geocode(query).await {
            Ok(Some(coords)) if coords.is_valid() => coords,
            Ok(_) => {
                tracing::debug!(query = %query, "Location unresolvable, using reference coordinate");
                self.fallback_center
            }
            Err(e) => {
                tracing::warn!(error = %e, query = %query, "Geocoding failed, using reference coordinate");
                self.fallback_center
            }
        }
    }

    async fn lookup_stored(
        &self,
        request: &AggregationRequest,
        center: Coordinates,
    ) -> Vec<Recommendation> {
        let result = if request.preferences.is_empty() {
            self.repository
                .find_by_location(center, DB_LOOKUP_RADIUS_KM, DB_LOOKUP_LIMIT)
                .await
        } else {
            self.repository
                .find_by_vibe_tags(&request.preferences, DB_LOOKUP_LIMIT)
                .await
        };

        match result {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Stored recommendation lookup failed");
                Vec::new()
            }
        }
    }

    /// Runs the per-venue video sub-pipeline as a bounded fan-out. A venue
    /// whose analysis fails is excluded; the rest of the batch survives.
    async fn enrich_venues(&self, venues: Vec<VenueRecord>) -> Vec<Recommendation> {
        let mut tasks = Vec::new();

        for venue in venues.into_iter().take(MAX_ENRICHMENT_BATCH) {
            let video = Arc::clone(&self.video);
            tasks.push(tokio::spawn(async move {
                let analysis = if venue.video_url.is_empty() {
                    None
                } else {
                    match analyze_video(video.as_ref(), &venue.video_url).await {
                        Ok(analysis) => Some(analysis),
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                venue_id = %venue.id,
                                "Video analysis failed, excluding venue"
                            );
                            return None;
                        }
                    }
                };
                normalize(ProviderRecord::TrendingVenue { venue, analysis })
            }));
        }

        collect_fanout(tasks).await
    }

    /// Detail-enriches up to five places concurrently. A place whose detail
    /// call errors is excluded; a place with no detail on record is kept.
    async fn enrich_places(&self, places: Vec<PlaceRecord>) -> Vec<Recommendation> {
        let mut tasks = Vec::new();

        for place in places.into_iter().take(MAX_ENRICHMENT_BATCH) {
            let provider = Arc::clone(&self.places);
            tasks.push(tokio::spawn(async move {
                let detail = match provider.place_details(&place.place_id).await {
                    Ok(detail) => detail,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            place_id = %place.place_id,
                            "Place detail fetch failed, excluding place"
                        );
                        return None;
                    }
                };
                normalize(ProviderRecord::Place { place, detail })
            }));
        }

        collect_fanout(tasks).await
    }

    /// Queues a live batch for storage so later requests can be answered from
    /// the repository directly. Fire and forget; a write failure only costs
    /// the next request a provider round trip.
    fn persist_in_background(&self, batch: &[Recommendation]) {
        let repository = Arc::clone(&self.repository);
        let records = batch.to_vec();
        tokio::spawn(async move {
            for record in records {
                if let Err(e) = repository.insert(&record).await {
                    tracing::debug!(error = %e, id = %record.id, "Recommendation persistence failed");
                    return;
                }
            }
        });
    }

    async fn generate(&self, request: &AggregationRequest) -> Vec<Recommendation> {
        match self
            .generator
            .generate(&request.location_query, &request.preferences)
            .await
        {
            Ok(generated) => generated
                .into_iter()
                .filter_map(|g| normalize(ProviderRecord::Generated(g)))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "AI generation failed");
                Vec::new()
            }
        }
    }
}

/// Issues the three analysis calls for one video concurrently and joins them
async fn analyze_video(
    provider: &dyn VideoAnalysisProvider,
    video_url: &str,
) -> ProviderResult<VideoAnalysis> {
    let (summary, sentiment, keywords) = tokio::join!(
        provider.summarize(video_url),
        provider.sentiment(video_url),
        provider.keywords(video_url)
    );

    Ok(VideoAnalysis {
        summary: summary?.summary,
        sentiment: sentiment?,
        keywords: keywords?,
    })
}

async fn collect_fanout(
    tasks: Vec<tokio::task::JoinHandle<Option<Recommendation>>>,
) -> Vec<Recommendation> {
    let mut batch = Vec::new();
    for task in tasks {
        match task.await {
            Ok(Some(recommendation)) => batch.push(recommendation),
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "Enrichment task join error"),
        }
    }
    batch
}

/// Keeps the first record for each id; batch ids are unique afterwards
fn dedupe_by_id(records: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockRecommendationRepository;
    use crate::error::{AppError, ProviderError};
    use crate::models::{SentimentBreakdown, VideoSummary};
    use crate::services::providers::{
        MockPlacesProvider, MockRecommendationGenerator, MockTrendProvider,
        MockVideoAnalysisProvider,
    };
    use chrono::Utc;

    const SF: Coordinates = Coordinates {
        lat: 37.7749,
        lng: -122.4194,
    };

    fn stored_rec(id: &str) -> Recommendation {
        Recommendation {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            venue_name: id.to_string(),
            location: SF,
            social_media_url: String::new(),
            image_url: String::new(),
            video_url: String::new(),
            trend_score: 75,
            vibe_tags: vec!["Chill".to_string()],
            timestamp: Utc::now(),
        }
    }

    fn venue(id: &str, video_url: &str) -> VenueRecord {
        VenueRecord {
            id: id.to_string(),
            name: format!("venue-{id}"),
            title: String::new(),
            description: "A trending spot".to_string(),
            address: String::new(),
            latitude: SF.lat,
            longitude: SF.lng,
            social_url: String::new(),
            video_url: video_url.to_string(),
            image_url: String::new(),
            trend_score: 80,
            categories: vec!["Foodie".to_string()],
            engagement: None,
        }
    }

    struct Mocks {
        repository: MockRecommendationRepository,
        trends: MockTrendProvider,
        places: MockPlacesProvider,
        video: MockVideoAnalysisProvider,
        generator: MockRecommendationGenerator,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                repository: MockRecommendationRepository::new(),
                trends: MockTrendProvider::new(),
                places: MockPlacesProvider::new(),
                video: MockVideoAnalysisProvider::new(),
                generator: MockRecommendationGenerator::new(),
            }
        }

        fn into_aggregator(self) -> Aggregator {
            Aggregator::new(
                Arc::new(self.repository),
                Arc::new(self.trends),
                Arc::new(self.places),
                Arc::new(self.video),
                Arc::new(self.generator),
                SF,
                5,
            )
        }
    }

    #[tokio::test]
    async fn test_stored_results_short_circuit() {
        let mut mocks = Mocks::new();
        mocks
            .places
            .expect_geocode()
            .returning(|_| Ok(Some(SF)));
        mocks.repository.expect_find_by_location().returning(|_, _, _| {
            Ok((1..=5).map(|i| stored_rec(&format!("db-{i}"))).collect())
        });
        // No trending/places/generator expectations: reaching them would panic

        let aggregator = mocks.into_aggregator();
        let result = aggregator.get_recommendations("San Francisco", &[]).await;

        assert_eq!(result.len(), 5);
        assert!(result.iter().all(|r| r.id.starts_with("db-")));
    }

    #[tokio::test]
    async fn test_preferences_route_to_tag_lookup() {
        let mut mocks = Mocks::new();
        mocks.places.expect_geocode().returning(|_| Ok(Some(SF)));
        mocks
            .repository
            .expect_find_by_vibe_tags()
            .withf(|tags: &[String], _: &usize| tags.len() == 1 && tags[0] == "Chill")
            .returning(|_, _| Ok((1..=5).map(|i| stored_rec(&format!("db-{i}"))).collect()));

        let aggregator = mocks.into_aggregator();
        let result = aggregator
            .get_recommendations("San Francisco", &["Chill".to_string()])
            .await;

        assert_eq!(result.len(), 5);
    }

    #[tokio::test]
    async fn test_trending_stage_when_db_short() {
        let mut mocks = Mocks::new();
        mocks.places.expect_geocode().returning(|_| Ok(Some(SF)));
        mocks
            .repository
            .expect_find_by_location()
            .returning(|_, _, _| Ok(vec![stored_rec("db-1")]));
        mocks.trends.expect_trending_venues().returning(|_, _| {
            Ok(vec![venue("1", ""), venue("2", "")])
        });
        mocks.repository.expect_insert().returning(|_| Ok(()));

        let aggregator = mocks.into_aggregator();
        let result = aggregator.get_recommendations("San Francisco", &[]).await;

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| !r.id.is_empty()));
        assert!(result.iter().all(|r| r.id.starts_with("rec-")));
    }

    #[tokio::test]
    async fn test_failed_video_analysis_excludes_only_that_venue() {
        let mut mocks = Mocks::new();
        mocks.places.expect_geocode().returning(|_| Ok(Some(SF)));
        mocks
            .repository
            .expect_find_by_location()
            .returning(|_, _, _| Ok(Vec::new()));
        mocks.trends.expect_trending_venues().returning(|_, _| {
            Ok(vec![
                venue("ok", "https://example.com/good.mp4"),
                venue("bad", "https://example.com/broken.mp4"),
            ])
        });
        mocks.video.expect_summarize().returning(|url| {
            if url.contains("broken") {
                Err(ProviderError::Unavailable("analysis down".to_string()))
            } else {
                Ok(VideoSummary {
                    summary: "Busy cafe".to_string(),
                    duration: 45,
                    language: "en".to_string(),
                })
            }
        });
        mocks
            .video
            .expect_sentiment()
            .returning(|_| Ok(SentimentBreakdown::default()));
        mocks.video.expect_keywords().returning(|_| Ok(vec![]));
        mocks.repository.expect_insert().returning(|_| Ok(()));

        let aggregator = mocks.into_aggregator();
        let result = aggregator.get_recommendations("San Francisco", &[]).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "rec-ok");
    }

    #[tokio::test]
    async fn test_places_stage_when_trending_empty() {
        let mut mocks = Mocks::new();
        mocks.places.expect_geocode().returning(|_| Ok(Some(SF)));
        mocks
            .repository
            .expect_find_by_location()
            .returning(|_, _, _| Ok(Vec::new()));
        mocks
            .trends
            .expect_trending_venues()
            .returning(|_, _| Ok(Vec::new()));
        mocks.places.expect_search_nearby().returning(|_, _| {
            Ok(vec![crate::models::PlaceRecord {
                place_id: "place1".to_string(),
                name: "Blue Bottle Coffee".to_string(),
                vicinity: "123 Main St".to_string(),
                geometry: crate::models::PlaceGeometry { location: SF },
                types: vec!["cafe".to_string()],
            }])
        });
        mocks
            .places
            .expect_place_details()
            .returning(|_| Ok(None));
        mocks.repository.expect_insert().returning(|_| Ok(()));

        let aggregator = mocks.into_aggregator();
        let result = aggregator.get_recommendations("San Francisco", &[]).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "place-place1");
        assert!((70..=100).contains(&result[0].trend_score));
    }

    #[tokio::test]
    async fn test_all_sources_fail_serves_exact_fallback_set() {
        let mut mocks = Mocks::new();
        mocks
            .places
            .expect_geocode()
            .returning(|q| Err(ProviderError::Geocode(q.to_string())));
        mocks
            .repository
            .expect_find_by_location()
            .returning(|_, _, _| Err(AppError::Internal("db down".to_string())));
        mocks
            .trends
            .expect_trending_venues()
            .returning(|_, _| Err(ProviderError::Unavailable("down".to_string())));
        mocks
            .places
            .expect_search_nearby()
            .returning(|_, _| Err(ProviderError::Unavailable("down".to_string())));
        mocks
            .generator
            .expect_generate()
            .returning(|_, _| Err(ProviderError::MalformedResponse("not json".to_string())));

        let aggregator = mocks.into_aggregator();
        let result = aggregator.get_recommendations("San Francisco", &[]).await;

        let expected: HashSet<String> = fallback_recommendations()
            .into_iter()
            .map(|r| r.id)
            .collect();
        let actual: HashSet<String> = result.into_iter().map(|r| r.id).collect();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_generation_stage_before_fallback() {
        let mut mocks = Mocks::new();
        mocks.places.expect_geocode().returning(|_| Ok(Some(SF)));
        mocks
            .repository
            .expect_find_by_location()
            .returning(|_, _, _| Ok(Vec::new()));
        mocks
            .trends
            .expect_trending_venues()
            .returning(|_, _| Ok(Vec::new()));
        mocks
            .places
            .expect_search_nearby()
            .returning(|_, _| Ok(Vec::new()));
        mocks.generator.expect_generate().returning(|_, _| {
            Ok(vec![crate::models::GeneratedRecommendation {
                recommendation_id: "g1".to_string(),
                title: "Generated Spot".to_string(),
                description: String::new(),
                venue_name: "Somewhere".to_string(),
                location: SF,
                social_media_url: String::new(),
                trend_score: 88,
                vibe_tags: vec!["Trendy".to_string()],
                image_url: String::new(),
                video_url: String::new(),
            }])
        });

        let aggregator = mocks.into_aggregator();
        let result = aggregator.get_recommendations("San Francisco", &[]).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "gen-g1");
    }

    #[tokio::test]
    async fn test_batch_ids_are_unique() {
        let mut mocks = Mocks::new();
        mocks.places.expect_geocode().returning(|_| Ok(Some(SF)));
        mocks
            .repository
            .expect_find_by_location()
            .returning(|_, _, _| Ok(Vec::new()));
        mocks.trends.expect_trending_venues().returning(|_, _| {
            Ok(vec![venue("dup", ""), venue("dup", ""), venue("other", "")])
        });
        mocks.repository.expect_insert().returning(|_| Ok(()));

        let aggregator = mocks.into_aggregator();
        let result = aggregator.get_recommendations("San Francisco", &[]).await;

        let ids: HashSet<String> = result.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids.len(), result.len());
        assert_eq!(result.len(), 2);
    }
}
