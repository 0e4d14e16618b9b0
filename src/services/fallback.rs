use chrono::{DateTime, TimeZone, Utc};

use crate::models::{Coordinates, Recommendation};

fn version_timestamp() -> DateTime<Utc> {
    // Fixed so the list is identical across calls and processes
    Utc.with_ymd_and_hms(2024, 8, 30, 0, 0, 0).single().unwrap_or_default()
}

fn record(
    id: &str,
    title: &str,
    description: &str,
    venue_name: &str,
    lat: f64,
    lng: f64,
    social: &str,
    score: u8,
    tags: &[&str],
    image_label: &str,
    video: &str,
) -> Recommendation {
    Recommendation {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        venue_name: venue_name.to_string(),
        location: Coordinates::new(lat, lng),
        social_media_url: social.to_string(),
        image_url: format!("https://via.placeholder.com/400x300?text={image_label}"),
        video_url: video.to_string(),
        trend_score: score,
        vibe_tags: tags.iter().map(|t| t.to_string()).collect(),
        timestamp: version_timestamp(),
    }
}

/// The static recommendation set served when no live source produces data.
///
/// Pure and versioned: same records every call, satisfying every canonical
/// invariant (valid coordinates, scores in range, non-empty tags).
pub fn fallback_recommendations() -> Vec<Recommendation> {
    vec![
        record(
            "fallback-1",
            "Cozy Coffee Spot",
            "Trending cafe with chill vibes and great lattes.",
            "Blue Bottle Coffee",
            37.7749,
            -122.4194,
            "https://instagram.com/bluebottle",
            85,
            &["Chill", "Coffee"],
            "Coffee",
            "https://example.com/video1.mp4",
        ),
        record(
            "fallback-2",
            "Rooftop Cocktail Bar",
            "Elegant rooftop bar with stunning city views and craft cocktails.",
            "Skyline Lounge",
            37.7833,
            -122.4167,
            "https://instagram.com/skylinelounge",
            92,
            &["Elegant", "Romantic", "Trendy"],
            "Cocktails",
            "https://example.com/video2.mp4",
        ),
        record(
            "fallback-3",
            "Underground Jazz Club",
            "Hidden jazz venue with live music and intimate atmosphere.",
            "Blue Note SF",
            37.7694,
            -122.4248,
            "https://instagram.com/bluenotesf",
            78,
            &["Intimate", "Chill", "Artsy"],
            "Jazz",
            "https://example.com/video3.mp4",
        ),
        record(
            "fallback-4",
            "Artisanal Food Market",
            "Bustling market with local vendors and gourmet food stalls.",
            "Ferry Building Marketplace",
            37.7955,
            -122.3937,
            "https://instagram.com/ferrybuilding",
            88,
            &["Energetic", "Foodie", "Vibrant"],
            "Market",
            "https://example.com/video4.mp4",
        ),
        record(
            "fallback-5",
            "Vintage Arcade Bar",
            "Retro gaming bar with classic arcade machines and themed drinks.",
            "Coin-Op Game Room",
            37.7765,
            -122.4130,
            "https://instagram.com/coinopgameroom",
            82,
            &["Retro", "Energetic", "Quirky"],
            "Arcade",
            "https://example.com/video5.mp4",
        ),
    ]
}
