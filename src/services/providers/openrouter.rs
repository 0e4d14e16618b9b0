/// OpenRouter-style AI recommendation generator
///
/// Asks a chat model for a JSON array of recommendation-shaped objects. Model
/// output is untrusted: content is stripped of markdown fences and parsed
/// defensively, with any parse failure reported as a malformed response so the
/// aggregator can substitute the fallback list.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{ProviderError, ProviderResult},
    models::GeneratedRecommendation,
    services::providers::{with_timeout, RecommendationGenerator},
};

const SYSTEM_PROMPT: &str = "Generate 5 mock trending local recommendations based on location and \
preferences. Output as JSON array of objects with keys: recommendationId, title, description, \
venue_name, location (object with lat and lng), social_media_url, trend_score, vibe_tags (array), \
image_url, video_url, timestamp.";

#[derive(Clone)]
pub struct OpenRouterGenerator {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default = "Vec::new")]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

impl OpenRouterGenerator {
    pub fn new(api_url: String, api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            api_key,
            model,
            timeout,
        }
    }

    async fn complete(&self, location: &str, preferences: &[String]) -> ProviderResult<String> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!(
                        "Location: {}, Preferences: {}",
                        location,
                        preferences.join(", ")
                    )
                }
            ]
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Unavailable(format!(
                "generator returned status {}: {}",
                status, text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse("empty choices".to_string()))
    }
}

/// Strips optional markdown code fences models wrap JSON in
fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}

fn parse_generated(content: &str) -> ProviderResult<Vec<GeneratedRecommendation>> {
    serde_json::from_str(strip_fences(content))
        .map_err(|e| ProviderError::MalformedResponse(format!("generator output: {}", e)))
}

#[async_trait::async_trait]
impl RecommendationGenerator for OpenRouterGenerator {
    async fn generate(
        &self,
        location: &str,
        preferences: &[String],
    ) -> ProviderResult<Vec<GeneratedRecommendation>> {
        let content =
            with_timeout(self.timeout, self.complete(location, preferences)).await?;
        let generated = parse_generated(&content)?;

        tracing::info!(
            count = generated.len(),
            location = %location,
            provider = "openrouter",
            "Recommendations generated"
        );

        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ARRAY: &str = r#"[
        {
            "recommendationId": "1",
            "title": "Cozy Coffee Spot",
            "venue_name": "Blue Bottle Coffee",
            "location": { "lat": 37.7749, "lng": -122.4194 },
            "trend_score": 85,
            "vibe_tags": ["Chill", "Coffee"]
        }
    ]"#;

    #[test]
    fn test_parse_generated_plain_array() {
        let parsed = parse_generated(VALID_ARRAY).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].recommendation_id, "1");
    }

    #[test]
    fn test_parse_generated_strips_markdown_fences() {
        let fenced = format!("```json\n{}\n```", VALID_ARRAY);
        let parsed = parse_generated(&fenced).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_parse_generated_malformed_is_error_not_panic() {
        let result = parse_generated("The model refused to answer.");
        assert!(matches!(result, Err(ProviderError::MalformedResponse(_))));
    }

    #[test]
    fn test_chat_response_empty_content_defaults() {
        let json = r#"{ "choices": [ { "message": {} } ] }"#;
        let chat: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(chat.choices[0].message.content, "");
    }
}
