/// EnsembleData-style social trend provider
///
/// Two endpoints back the pipeline: trending posts near a coordinate (surfaced
/// directly through the API) and trending venues (step two of aggregation).
/// Venue lookups are cached in Redis keyed by rounded coordinates.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{ProviderError, ProviderResult},
    models::{Coordinates, TrendingPost, VenueRecord},
    services::providers::{with_timeout, TrendProvider},
};

const TRENDING_CACHE_TTL: u64 = 900; // 15 minutes

#[derive(Clone)]
pub struct EnsembleProvider {
    http_client: HttpClient,
    api_url: String,
    api_token: String,
    timeout: Duration,
    cache: Cache,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl EnsembleProvider {
    pub fn new(api_url: String, api_token: String, timeout: Duration, cache: Cache) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            api_token,
            timeout,
            cache,
        }
    }

    async fn fetch_list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        center: Coordinates,
        limit: usize,
    ) -> ProviderResult<Vec<T>> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("token", self.api_token.as_str()),
                ("latitude", &center.lat.to_string()),
                ("longitude", &center.lng.to_string()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "trend provider returned status {}: {}",
                status, body
            )));
        }

        let envelope: DataEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(envelope.data)
    }
}

#[async_trait::async_trait]
impl TrendProvider for EnsembleProvider {
    async fn trending_content(
        &self,
        center: Coordinates,
        limit: usize,
    ) -> ProviderResult<Vec<TrendingPost>> {
        let posts = with_timeout(
            self.timeout,
            self.fetch_list::<TrendingPost>("/trending/content", center, limit),
        )
        .await?;

        tracing::info!(
            count = posts.len(),
            lat = center.lat,
            lng = center.lng,
            provider = "ensemble",
            "Trending content fetched"
        );

        Ok(posts)
    }

    async fn trending_venues(
        &self,
        center: Coordinates,
        limit: usize,
    ) -> ProviderResult<Vec<VenueRecord>> {
        let key = CacheKey::TrendingVenues {
            lat: center.lat,
            lng: center.lng,
        };

        let venues: Vec<VenueRecord> = cached!(self.cache, key, TRENDING_CACHE_TTL, async {
            with_timeout(
                self.timeout,
                self.fetch_list::<VenueRecord>("/trending/venues", center, limit),
            )
            .await
        })?;

        tracing::info!(
            count = venues.len(),
            lat = center.lat,
            lng = center.lng,
            provider = "ensemble",
            "Trending venues fetched"
        );

        Ok(venues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_envelope_missing_field_defaults_empty() {
        let envelope: DataEnvelope<VenueRecord> = serde_json::from_str("{}").unwrap();
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn test_data_envelope_deserializes_venues() {
        let json = r#"{
            "data": [
                {
                    "id": "1",
                    "name": "Blue Bottle Coffee",
                    "title": "Cozy Coffee Spot",
                    "latitude": 37.7749,
                    "longitude": -122.4194,
                    "trend_score": 85,
                    "categories": ["Coffee", "Cafe"]
                }
            ]
        }"#;

        let envelope: DataEnvelope<VenueRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].name, "Blue Bottle Coffee");
        assert_eq!(envelope.data[0].trend_score, 85);
    }
}
