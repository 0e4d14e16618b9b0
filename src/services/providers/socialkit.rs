/// SocialKit-style video analysis provider
///
/// Three independent calls per video (summary, sentiment, keywords); the
/// aggregator issues them concurrently and joins. Nothing is cached: each
/// analysis is tied to a short-lived trending batch.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{ProviderError, ProviderResult},
    models::{SentimentBreakdown, VideoSummary},
    services::providers::{with_timeout, VideoAnalysisProvider},
};

#[derive(Clone)]
pub struct SocialKitProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct KeywordsResponse {
    #[serde(default = "Vec::new")]
    keywords: Vec<String>,
}

impl SocialKitProvider {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            api_key,
            timeout,
        }
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        video_url: &str,
    ) -> ProviderResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("url", video_url), ("access_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::Unavailable(format!(
                "video analysis returned status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl VideoAnalysisProvider for SocialKitProvider {
    async fn summarize(&self, video_url: &str) -> ProviderResult<VideoSummary> {
        with_timeout(self.timeout, self.fetch("/video/summary", video_url)).await
    }

    async fn sentiment(&self, video_url: &str) -> ProviderResult<SentimentBreakdown> {
        with_timeout(self.timeout, self.fetch("/video/sentiment", video_url)).await
    }

    async fn keywords(&self, video_url: &str) -> ProviderResult<Vec<String>> {
        let response: KeywordsResponse =
            with_timeout(self.timeout, self.fetch("/video/keywords", video_url)).await?;
        Ok(response.keywords)
    }
}
