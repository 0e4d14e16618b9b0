use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Coordinates, Recommendation},
};

/// Storage seam for persisted recommendations.
///
/// The aggregator only ever talks to this trait, so tests (and deployments
/// without a database) can substitute the in-memory implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationRepository: Send + Sync {
    /// Recommendations whose venue lies within `radius_km` of the point
    async fn find_by_location(
        &self,
        center: Coordinates,
        radius_km: f64,
        limit: usize,
    ) -> AppResult<Vec<Recommendation>>;

    /// Recommendations sharing at least one of the given vibe tags
    async fn find_by_vibe_tags(
        &self,
        tags: &[String],
        limit: usize,
    ) -> AppResult<Vec<Recommendation>>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Recommendation>>;

    /// Stores a record; existing ids are left untouched
    async fn insert(&self, recommendation: &Recommendation) -> AppResult<()>;
}

// ============================================================================
// Postgres implementation
// ============================================================================

#[derive(sqlx::FromRow)]
struct RecommendationRow {
    id: String,
    title: String,
    description: String,
    venue_name: String,
    latitude: f64,
    longitude: f64,
    social_media_url: String,
    image_url: String,
    video_url: String,
    trend_score: i16,
    vibe_tags: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<RecommendationRow> for Recommendation {
    fn from(row: RecommendationRow) -> Self {
        Recommendation {
            id: row.id,
            title: row.title,
            description: row.description,
            venue_name: row.venue_name,
            location: Coordinates::new(row.latitude, row.longitude),
            social_media_url: row.social_media_url,
            image_url: row.image_url,
            video_url: row.video_url,
            trend_score: row.trend_score.clamp(0, 100) as u8,
            vibe_tags: row.vibe_tags,
            timestamp: row.created_at,
        }
    }
}

pub struct PostgresRecommendationRepository {
    pool: PgPool,
}

impl PostgresRecommendationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RecommendationRepository for PostgresRecommendationRepository {
    async fn find_by_location(
        &self,
        center: Coordinates,
        radius_km: f64,
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        // Bounding-box approximation; one degree of latitude is ~111km
        let delta = radius_km / 111.0;

        let rows = sqlx::query_as::<_, RecommendationRow>(
            r#"
            SELECT id, title, description, venue_name, latitude, longitude,
                   social_media_url, image_url, video_url, trend_score, vibe_tags, created_at
            FROM recommendations
            WHERE latitude BETWEEN $1 AND $2
              AND longitude BETWEEN $3 AND $4
            ORDER BY trend_score DESC
            LIMIT $5
            "#,
        )
        .bind(center.lat - delta)
        .bind(center.lat + delta)
        .bind(center.lng - delta)
        .bind(center.lng + delta)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Recommendation::from).collect())
    }

    async fn find_by_vibe_tags(
        &self,
        tags: &[String],
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let rows = sqlx::query_as::<_, RecommendationRow>(
            r#"
            SELECT id, title, description, venue_name, latitude, longitude,
                   social_media_url, image_url, video_url, trend_score, vibe_tags, created_at
            FROM recommendations
            WHERE vibe_tags && $1
            ORDER BY trend_score DESC
            LIMIT $2
            "#,
        )
        .bind(tags)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Recommendation::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Recommendation>> {
        let row = sqlx::query_as::<_, RecommendationRow>(
            r#"
            SELECT id, title, description, venue_name, latitude, longitude,
                   social_media_url, image_url, video_url, trend_score, vibe_tags, created_at
            FROM recommendations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Recommendation::from))
    }

    async fn insert(&self, recommendation: &Recommendation) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO recommendations
                (id, title, description, venue_name, latitude, longitude,
                 social_media_url, image_url, video_url, trend_score, vibe_tags, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&recommendation.id)
        .bind(&recommendation.title)
        .bind(&recommendation.description)
        .bind(&recommendation.venue_name)
        .bind(recommendation.location.lat)
        .bind(recommendation.location.lng)
        .bind(&recommendation.social_media_url)
        .bind(&recommendation.image_url)
        .bind(&recommendation.video_url)
        .bind(recommendation.trend_score as i16)
        .bind(&recommendation.vibe_tags)
        .bind(recommendation.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// Map-backed repository used in tests and database-less deployments
#[derive(Default)]
pub struct InMemoryRecommendationRepository {
    records: Arc<RwLock<HashMap<String, Recommendation>>>,
}

impl InMemoryRecommendationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor seeding the store with records
    pub fn with_records(records: Vec<Recommendation>) -> Self {
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait::async_trait]
impl RecommendationRepository for InMemoryRecommendationRepository {
    async fn find_by_location(
        &self,
        center: Coordinates,
        radius_km: f64,
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let delta = radius_km / 111.0;
        let records = self.records.read().await;

        let mut matches: Vec<Recommendation> = records
            .values()
            .filter(|r| {
                (r.location.lat - center.lat).abs() <= delta
                    && (r.location.lng - center.lng).abs() <= delta
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.trend_score.cmp(&a.trend_score).then(a.id.cmp(&b.id)));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn find_by_vibe_tags(
        &self,
        tags: &[String],
        limit: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let records = self.records.read().await;

        let mut matches: Vec<Recommendation> = records
            .values()
            .filter(|r| {
                r.vibe_tags
                    .iter()
                    .any(|t| tags.iter().any(|q| q.eq_ignore_ascii_case(t)))
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.trend_score.cmp(&a.trend_score).then(a.id.cmp(&b.id)));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Recommendation>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn insert(&self, recommendation: &Recommendation) -> AppResult<()> {
        let mut records = self.records.write().await;
        records
            .entry(recommendation.id.clone())
            .or_insert_with(|| recommendation.clone());
        Ok(())
    }
}
