use chrono::Utc;

use crate::models::{
    Coordinates, GeneratedRecommendation, PlaceDetail, PlaceRecord, ProviderRecord,
    Recommendation, VenueRecord, VideoAnalysis,
};
use crate::services::trends;

/// Tag applied when a source yields no usable category labels
const DEFAULT_VIBE_TAG: &str = "Trending";

/// Place types that translate to vibe labels
const PLACE_TYPE_VIBES: [(&str, &str); 8] = [
    ("cafe", "Chill"),
    ("bar", "Lively"),
    ("restaurant", "Foodie"),
    ("night_club", "Energetic"),
    ("art_gallery", "Artsy"),
    ("museum", "Artsy"),
    ("park", "Casual"),
    ("shopping_mall", "Trendy"),
];

/// Converts a provider payload into the canonical record.
///
/// Total over the union apart from coordinate validation: a payload with
/// out-of-range coordinates returns `None` and the caller drops it. All other
/// rules substitute rather than reject: empty URLs stay empty strings, scores
/// clamp into 0..=100, and an empty tag list becomes `["Trending"]`.
pub fn normalize(record: ProviderRecord) -> Option<Recommendation> {
    match record {
        ProviderRecord::TrendingVenue { venue, analysis } => normalize_venue(venue, analysis),
        ProviderRecord::Place { place, detail } => normalize_place(place, detail),
        ProviderRecord::Generated(generated) => normalize_generated(generated),
    }
}

fn normalize_venue(venue: VenueRecord, analysis: Option<VideoAnalysis>) -> Option<Recommendation> {
    let location = Coordinates::new(venue.latitude, venue.longitude);
    if !location.is_valid() {
        tracing::warn!(venue_id = %venue.id, "Dropping venue with out-of-range coordinates");
        return None;
    }

    let title = if venue.title.is_empty() {
        venue.name.clone()
    } else {
        venue.title
    };

    let description = match (&venue.description, &analysis) {
        (d, _) if !d.is_empty() => venue.description.clone(),
        (_, Some(a)) if !a.summary.is_empty() => a.summary.clone(),
        _ => String::new(),
    };

    // Prefer a score computed from real engagement + sentiment when available
    let trend_score = match (&venue.engagement, &analysis) {
        (Some(engagement), Some(a)) => trends::trend_score(
            engagement.views,
            engagement.likes,
            engagement.comments,
            trends::positive_ratio(&a.sentiment),
        ),
        _ => venue.trend_score.min(100) as u8,
    };

    let mut vibe_tags = venue.categories;
    if vibe_tags.is_empty() {
        if let Some(a) = &analysis {
            vibe_tags = a.keywords.clone();
        }
    }

    Some(Recommendation {
        id: format!("rec-{}", venue.id),
        title,
        description,
        venue_name: venue.name,
        location,
        social_media_url: venue.social_url,
        image_url: venue.image_url,
        video_url: venue.video_url,
        trend_score,
        vibe_tags: clean_tags(vibe_tags),
        timestamp: Utc::now(),
    })
}

fn normalize_place(place: PlaceRecord, detail: Option<PlaceDetail>) -> Option<Recommendation> {
    let location = place.location();
    if !location.is_valid() {
        tracing::warn!(place_id = %place.place_id, "Dropping place with out-of-range coordinates");
        return None;
    }

    let description = match &detail {
        Some(d) if d.rating.is_some() => format!(
            "{}, rated {:.1} by {} visitors",
            place.vicinity,
            d.rating.unwrap_or_default(),
            d.user_ratings_total.unwrap_or_default()
        ),
        _ => place.vicinity.clone(),
    };

    let vibe_tags: Vec<String> = place
        .types
        .iter()
        .filter_map(|t| {
            PLACE_TYPE_VIBES
                .iter()
                .find(|(place_type, _)| place_type == t)
                .map(|(_, vibe)| vibe.to_string())
        })
        .collect();

    let image_url = format!(
        "https://via.placeholder.com/400x300?text={}",
        urlencode(&place.name)
    );

    Some(Recommendation {
        id: format!("place-{}", place.place_id),
        title: place.name.clone(),
        description,
        venue_name: place.name,
        location,
        social_media_url: String::new(),
        image_url,
        video_url: String::new(),
        trend_score: synthesized_score(&place.place_id),
        vibe_tags: clean_tags(vibe_tags),
        timestamp: Utc::now(),
    })
}

fn normalize_generated(generated: GeneratedRecommendation) -> Option<Recommendation> {
    if !generated.location.is_valid() {
        tracing::warn!(
            id = %generated.recommendation_id,
            "Dropping generated record with out-of-range coordinates"
        );
        return None;
    }

    let id = if generated.recommendation_id.is_empty() {
        format!("gen-{}", uuid::Uuid::new_v4())
    } else {
        format!("gen-{}", generated.recommendation_id)
    };

    Some(Recommendation {
        id,
        title: generated.title,
        description: generated.description,
        venue_name: generated.venue_name,
        location: generated.location,
        social_media_url: generated.social_media_url,
        image_url: generated.image_url,
        video_url: generated.video_url,
        trend_score: generated.trend_score.clamp(0, 100) as u8,
        vibe_tags: clean_tags(generated.vibe_tags),
        timestamp: Utc::now(),
    })
}

/// Deduplicates tags preserving first occurrence; empty list becomes the
/// default tag so no record ever leaves normalization untagged
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut cleaned: Vec<String> = tags
        .into_iter()
        .filter(|t| !t.trim().is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect();

    if cleaned.is_empty() {
        cleaned.push(DEFAULT_VIBE_TAG.to_string());
    }
    cleaned
}

/// Deterministic placeholder score in 70..=100 for sources without a native
/// one. An FNV-1a hash of the id keeps repeated aggregations agreeing on
/// ordering.
fn synthesized_score(id: &str) -> u8 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in id.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    70 + (hash % 31) as u8
}

fn urlencode(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == ' ' { '+' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '.'))
        .collect()
}
