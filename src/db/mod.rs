pub mod cache;
pub mod postgres;
pub mod repository;

pub use cache::{create_redis_client, Cache, CacheKey};
pub use postgres::create_pool;
pub use repository::{
    InMemoryRecommendationRepository, PostgresRecommendationRepository, RecommendationRepository,
};

#[cfg(test)]
pub use repository::MockRecommendationRepository;
