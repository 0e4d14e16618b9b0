use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, PostgresRecommendationRepository},
    models::Coordinates,
    services::{
        providers::{
            EnsembleProvider, GoogleMapsProvider, OpenRouterGenerator, PlacesProvider,
            SocialKitProvider, TrendProvider,
        },
        Aggregator, InMemoryUserStore, Ranker, SubscriptionManager, UserStore,
    },
};

/// Shared application state, cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub ranker: Arc<Ranker>,
    pub trends: Arc<dyn TrendProvider>,
    pub users: Arc<dyn UserStore>,
    pub subscriptions: Arc<SubscriptionManager>,
    pub default_center: Coordinates,
}

impl AppState {
    pub fn new(
        aggregator: Arc<Aggregator>,
        ranker: Arc<Ranker>,
        trends: Arc<dyn TrendProvider>,
        users: Arc<dyn UserStore>,
        default_center: Coordinates,
    ) -> Self {
        let subscriptions = Arc::new(SubscriptionManager::new(users.clone()));
        Self {
            aggregator,
            ranker,
            trends,
            users,
            subscriptions,
            default_center,
        }
    }

    /// Wires the full production dependency graph from configuration.
    ///
    /// Must run inside a Tokio runtime: the cache spawns its background
    /// writer task on construction. Postgres connects lazily, so an
    /// unreachable database does not prevent startup.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let cache = Cache::new(create_redis_client(&config.redis_url)?);
        let pool = create_pool(&config.database_url)?;
        let timeout = Duration::from_secs(config.provider_timeout_secs);
        let center = Coordinates {
            lat: config.default_lat,
            lng: config.default_lng,
        };

        let repository = Arc::new(PostgresRecommendationRepository::new(pool));

        let trends: Arc<dyn TrendProvider> = Arc::new(EnsembleProvider::new(
            config.ensemble_api_url.clone(),
            config.ensemble_api_key.clone(),
            timeout,
            cache.clone(),
        ));

        let places: Arc<dyn PlacesProvider> = Arc::new(GoogleMapsProvider::new(
            config.maps_api_url.clone(),
            config.maps_api_key.clone(),
            timeout,
            cache.clone(),
        ));

        let video = Arc::new(SocialKitProvider::new(
            config.socialkit_api_url.clone(),
            config.socialkit_api_key.clone(),
            timeout,
        ));

        let generator = Arc::new(OpenRouterGenerator::new(
            config.openrouter_api_url.clone(),
            config.openrouter_api_key.clone(),
            config.openrouter_model.clone(),
            timeout,
        ));

        let aggregator = Arc::new(Aggregator::new(
            repository,
            trends.clone(),
            places,
            video,
            generator,
            center,
            config.min_results,
        ));

        let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());

        Ok(Self::new(
            aggregator,
            Arc::new(Ranker::new(config.ranker_jitter)),
            trends,
            users,
            center,
        ))
    }
}
