use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic point. Latitude in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components fall in the valid coordinate range
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Canonical recommendation record returned to clients.
///
/// Immutable once produced: records are saved by id reference, never edited.
/// Invariants (enforced by the normalizer): `trend_score` in 0..=100,
/// `vibe_tags` non-empty and unique within the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub venue_name: String,
    pub location: Coordinates,
    /// Optional URLs are carried as empty strings rather than omitted keys
    pub social_media_url: String,
    pub image_url: String,
    pub video_url: String,
    pub trend_score: u8,
    pub vibe_tags: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// One call into the aggregation pipeline. Transient, never persisted.
#[derive(Debug, Clone)]
pub struct AggregationRequest {
    pub location_query: String,
    pub preferences: Vec<String>,
    pub min_results: usize,
}

impl AggregationRequest {
    pub fn new(location_query: impl Into<String>, preferences: Vec<String>) -> Self {
        Self {
            location_query: location_query.into(),
            preferences,
            min_results: 5,
        }
    }
}

// ============================================================================
// Provider payloads
// ============================================================================

/// Raw engagement counters attached to trending content
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngagementStats {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
}

/// A trending venue as reported by the social trend provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VenueRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub social_url: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub trend_score: u32,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub engagement: Option<EngagementStats>,
}

/// A single trending post (video/photo) from the social trend provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub social_url: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub venue_name: String,
}

/// Nearby-search result from the places provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceRecord {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub vicinity: String,
    pub geometry: PlaceGeometry,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceGeometry {
    pub location: Coordinates,
}

impl PlaceRecord {
    pub fn location(&self) -> Coordinates {
        self.geometry.location
    }
}

/// Detail lookup for a single place
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlaceDetail {
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub user_ratings_total: Option<u64>,
}

/// Recommendation-shaped object produced by the AI generator.
///
/// Field names mirror the JSON the model is prompted to emit; everything is
/// defaulted because model output is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedRecommendation {
    #[serde(rename = "recommendationId", default)]
    pub recommendation_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub venue_name: String,
    pub location: Coordinates,
    #[serde(default)]
    pub social_media_url: String,
    #[serde(default)]
    pub trend_score: i64,
    #[serde(default)]
    pub vibe_tags: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub video_url: String,
}

// ============================================================================
// Video analysis
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSummary {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub language: String,
}

/// Positive/neutral/negative split as percentages
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SentimentBreakdown {
    #[serde(default)]
    pub positive: u8,
    #[serde(default)]
    pub neutral: u8,
    #[serde(default)]
    pub negative: u8,
}

/// Joined output of the per-venue enrichment fan-out
#[derive(Debug, Clone)]
pub struct VideoAnalysis {
    pub summary: String,
    pub sentiment: SentimentBreakdown,
    pub keywords: Vec<String>,
}

/// Tagged union of every payload the normalizer accepts.
///
/// Each variant carries only the fields its source guarantees; the normalizer
/// matches exhaustively so a new source cannot be added without deciding how
/// it maps onto the canonical record.
#[derive(Debug, Clone)]
pub enum ProviderRecord {
    TrendingVenue {
        venue: VenueRecord,
        analysis: Option<VideoAnalysis>,
    },
    Place {
        place: PlaceRecord,
        detail: Option<PlaceDetail>,
    },
    Generated(GeneratedRecommendation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_valid_range() {
        assert!(Coordinates::new(37.7749, -122.4194).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(90.1, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn test_aggregation_request_defaults_min_results() {
        let req = AggregationRequest::new("San Francisco", vec!["Chill".to_string()]);
        assert_eq!(req.min_results, 5);
        assert_eq!(req.location_query, "San Francisco");
    }

    #[test]
    fn test_venue_record_deserialization_defaults() {
        let json = r#"{
            "id": "1",
            "name": "Blue Bottle Coffee",
            "latitude": 37.7749,
            "longitude": -122.4194,
            "trend_score": 85,
            "categories": ["Coffee", "Cafe"]
        }"#;

        let venue: VenueRecord = serde_json::from_str(json).unwrap();
        assert_eq!(venue.name, "Blue Bottle Coffee");
        assert_eq!(venue.trend_score, 85);
        assert!(venue.social_url.is_empty());
        assert!(venue.engagement.is_none());
    }

    #[test]
    fn test_place_record_deserialization() {
        let json = r#"{
            "place_id": "place1",
            "name": "Skyline Lounge",
            "vicinity": "456 Market St, San Francisco, CA",
            "geometry": { "location": { "lat": 37.7833, "lng": -122.4167 } },
            "types": ["bar", "restaurant"]
        }"#;

        let place: PlaceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(place.place_id, "place1");
        assert!((place.location().lat - 37.7833).abs() < 1e-9);
        assert_eq!(place.types, vec!["bar", "restaurant"]);
    }

    #[test]
    fn test_generated_recommendation_accepts_model_field_names() {
        let json = r#"{
            "recommendationId": "gen-1",
            "title": "Cozy Coffee Spot",
            "venue_name": "Blue Bottle Coffee",
            "location": { "lat": 37.7749, "lng": -122.4194 },
            "trend_score": 85,
            "vibe_tags": ["Chill", "Coffee"]
        }"#;

        let rec: GeneratedRecommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.recommendation_id, "gen-1");
        assert_eq!(rec.trend_score, 85);
        assert!(rec.video_url.is_empty());
    }

    #[test]
    fn test_recommendation_serializes_timestamp_iso8601() {
        let rec = Recommendation {
            id: "r1".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            venue_name: "v".to_string(),
            location: Coordinates::new(0.0, 0.0),
            social_media_url: String::new(),
            image_url: String::new(),
            video_url: String::new(),
            trend_score: 80,
            vibe_tags: vec!["Trending".to_string()],
            timestamp: chrono::DateTime::parse_from_rfc3339("2024-08-30T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["timestamp"], "2024-08-30T12:00:00Z");
        assert_eq!(json["trend_score"], 80);
    }
}
