use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Builds the full application router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Recommendations
        .route("/recommendations", post(handlers::get_recommendations))
        .route("/recommendations/save", post(handlers::save_recommendation))
        // Discovery surfaces
        .route("/trending", get(handlers::trending))
        .route("/vibes", get(handlers::vibes))
        // Users
        .route("/users/:id", get(handlers::get_user))
        .route("/users/:id/saved", get(handlers::saved_recommendations))
        .route("/users/:id/preferences", put(handlers::update_preferences))
        .route("/users/:id/onboarding", post(handlers::complete_onboarding))
        // Subscriptions
        .route("/subscription/:id/subscribe", post(handlers::subscribe))
        .route("/subscription/:id/cancel", post(handlers::cancel_subscription));

    // Layers added later wrap the ones before them: the request id has to be
    // in extensions before the trace span is built
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
