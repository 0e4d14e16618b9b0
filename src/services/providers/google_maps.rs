/// Google-Maps-style places and geocoding provider
///
/// API flow:
/// 1. Geocode: /geocode/json?address= -> first result's geometry.location
/// 2. Nearby:  /place/nearbysearch/json?location=lat,lng&radius=
/// 3. Details: /place/details/json?place_id=
///
/// Geocode answers and place details are cached in Redis; nearby searches are
/// not, since trending data shifts too quickly for a stale list to help.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{ProviderError, ProviderResult},
    models::{Coordinates, PlaceDetail, PlaceRecord},
    services::providers::{with_timeout, PlacesProvider},
};

const GEOCODE_CACHE_TTL: u64 = 604_800; // 1 week
const DETAILS_CACHE_TTL: u64 = 86_400; // 1 day

#[derive(Clone)]
pub struct GoogleMapsProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
    timeout: Duration,
    cache: Cache,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default = "Vec::new")]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Deserialize)]
struct GeocodeGeometry {
    location: Coordinates,
}

#[derive(Deserialize)]
struct NearbySearchResponse {
    #[serde(default = "Vec::new")]
    results: Vec<PlaceRecord>,
}

#[derive(Deserialize)]
struct PlaceDetailsResponse {
    result: Option<PlaceDetail>,
}

impl GoogleMapsProvider {
    pub fn new(api_url: String, api_key: String, timeout: Duration, cache: Cache) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            api_key,
            timeout,
            cache,
        }
    }

    async fn fetch_geocode(&self, query: &str) -> ProviderResult<Vec<Coordinates>> {
        let url = format!("{}/geocode/json", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Geocode(query.to_string()));
        }

        let geocode: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(geocode
            .results
            .into_iter()
            .map(|r| r.geometry.location)
            .collect())
    }
}

#[async_trait::async_trait]
impl PlacesProvider for GoogleMapsProvider {
    async fn geocode(&self, query: &str) -> ProviderResult<Option<Coordinates>> {
        let key = CacheKey::Geocode(query.to_string());

        let candidates: Vec<Coordinates> = cached!(self.cache, key, GEOCODE_CACHE_TTL, async {
            with_timeout(self.timeout, self.fetch_geocode(query)).await
        })?;

        let resolved = candidates.into_iter().next();
        tracing::debug!(query = %query, resolved = ?resolved, provider = "maps", "Geocode lookup");
        Ok(resolved)
    }

    async fn search_nearby(
        &self,
        center: Coordinates,
        radius_m: u32,
    ) -> ProviderResult<Vec<PlaceRecord>> {
        let url = format!("{}/place/nearbysearch/json", self.api_url);
        let location = format!("{},{}", center.lat, center.lng);

        let places = with_timeout(self.timeout, async {
            let response = self
                .http_client
                .get(&url)
                .query(&[
                    ("location", location.as_str()),
                    ("radius", &radius_m.to_string()),
                    ("key", self.api_key.as_str()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                return Err(ProviderError::Unavailable(format!(
                    "places provider returned status {}",
                    status
                )));
            }

            let search: NearbySearchResponse = response
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

            Ok(search.results)
        })
        .await?;

        tracing::info!(
            count = places.len(),
            lat = center.lat,
            lng = center.lng,
            provider = "maps",
            "Nearby places fetched"
        );

        Ok(places)
    }

    async fn place_details(&self, place_id: &str) -> ProviderResult<Option<PlaceDetail>> {
        let key = CacheKey::PlaceDetails(place_id.to_string());
        let url = format!("{}/place/details/json", self.api_url);

        let detail: Option<PlaceDetail> = cached!(self.cache, key, DETAILS_CACHE_TTL, async {
            with_timeout(self.timeout, async {
                let response = self
                    .http_client
                    .get(&url)
                    .query(&[("place_id", place_id), ("key", self.api_key.as_str())])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    return Err(ProviderError::Unavailable(format!(
                        "place details returned status {}",
                        status
                    )));
                }

                let details: PlaceDetailsResponse = response
                    .json()
                    .await
                    .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

                Ok(details.result)
            })
            .await
        })?;

        Ok(detail)
    }
}
