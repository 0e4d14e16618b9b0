use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{Coordinates, Recommendation, SubscriptionTier, TrendingPost, UserProfile, VIBE_CATEGORIES},
    services::subscription,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationsRequest {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub preferences: Vec<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct SaveRecommendationRequest {
    pub user_id: String,
    pub recommendation_id: String,
}

#[derive(Debug, Serialize)]
pub struct SaveRecommendationResponse {
    pub saved: bool,
}

#[derive(Debug, Serialize)]
pub struct SavedRecommendationsResponse {
    pub recommendation_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub preferences: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub limit: Option<usize>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Aggregates and ranks recommendations for a location.
///
/// Always answers 200 with a non-empty list: aggregation degrades through its
/// source stages down to the static fallback list rather than failing. When a
/// known user sends no explicit preferences, their stored preferences apply,
/// clamped to what their tier allows.
pub async fn get_recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationsRequest>,
) -> Json<RecommendationsResponse> {
    let profile = match &request.user_id {
        Some(user_id) => match state.users.get_user(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "User lookup failed, ignoring profile");
                None
            }
        },
        None => None,
    };

    let tier = profile
        .as_ref()
        .map(|p| p.subscription)
        .unwrap_or(SubscriptionTier::Free);

    let preferences = if request.preferences.is_empty() {
        profile.map(|p| p.preferences).unwrap_or_default()
    } else {
        request.preferences
    };
    let preferences = subscription::clamp_preferences(tier, preferences);

    let batch = state
        .aggregator
        .get_recommendations(&request.location, &preferences)
        .await;
    let ranked = state.ranker.rank(batch, &preferences);

    Json(RecommendationsResponse {
        count: ranked.len(),
        recommendations: ranked,
    })
}

/// Saves a recommendation to a user's list; idempotent per id
pub async fn save_recommendation(
    State(state): State<AppState>,
    Json(request): Json<SaveRecommendationRequest>,
) -> AppResult<Json<SaveRecommendationResponse>> {
    if request.recommendation_id.is_empty() {
        return Err(AppError::InvalidInput(
            "recommendation_id must not be empty".to_string(),
        ));
    }

    let saved = state
        .users
        .save_recommendation(&request.user_id, &request.recommendation_id)
        .await?;

    Ok(Json(SaveRecommendationResponse { saved }))
}

pub async fn saved_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<SavedRecommendationsResponse>> {
    let recommendation_ids = state.users.saved_recommendations(&user_id).await?;
    Ok(Json(SavedRecommendationsResponse { recommendation_ids }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .users
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;

    Ok(Json(profile))
}

/// Replaces a user's vibe preferences.
///
/// Names are validated case-insensitively against the vibe vocabulary; the
/// accepted list is truncated to the user's tier limit.
pub async fn update_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> AppResult<Json<UserProfile>> {
    for preference in &request.preferences {
        let known = VIBE_CATEGORIES
            .iter()
            .any(|vibe| vibe.eq_ignore_ascii_case(preference));
        if !known {
            return Err(AppError::InvalidInput(format!(
                "unknown vibe category: {}",
                preference
            )));
        }
    }

    let tier = state
        .users
        .get_user(&user_id)
        .await?
        .map(|p| p.subscription)
        .unwrap_or(SubscriptionTier::Free);

    let preferences = subscription::clamp_preferences(tier, request.preferences);
    let profile = state.users.update_preferences(&user_id, preferences).await?;

    Ok(Json(profile))
}

pub async fn complete_onboarding(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.users.complete_onboarding(&user_id).await?;
    Ok(Json(profile))
}

pub async fn subscribe(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.subscriptions.subscribe_premium(&user_id).await?;
    Ok(Json(profile))
}

pub async fn cancel_subscription(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.subscriptions.cancel(&user_id).await?;
    Ok(Json(profile))
}

/// The fixed vibe vocabulary clients build filter UIs from
pub async fn vibes() -> Json<Vec<&'static str>> {
    Json(VIBE_CATEGORIES.to_vec())
}

/// Trending social posts near a coordinate, straight from the trend provider
pub async fn trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> AppResult<Json<Vec<TrendingPost>>> {
    let center = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => {
            let center = Coordinates { lat, lng };
            if !center.is_valid() {
                return Err(AppError::InvalidInput(format!(
                    "coordinates out of range: {}, {}",
                    lat, lng
                )));
            }
            center
        }
        _ => state.default_center,
    };

    let posts = state
        .trends
        .trending_content(center, params.limit.unwrap_or(10))
        .await?;

    Ok(Json(posts))
}
