use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::ApiError;
use crate::news::category::Category;
use crate::state::AppState;

/// Country the site aggregates headlines for.
pub const DEFAULT_COUNTRY: &str = "us";

/// A transient externally sourced headline. Never persisted; lives only for
/// the duration of one proxied response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalHeadline {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<HeadlineSource>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeadlineSource {
    pub name: Option<String>,
}

/// Fetches top headlines from the upstream API and returns the payload as-is.
///
/// Fails with a configuration error when no API key is set, and with an
/// upstream error when the call itself fails. Never retried, never cached.
#[instrument(skip(state))]
pub async fn top_headlines(
    state: &AppState,
    country: &str,
    category: Option<Category>,
) -> Result<serde_json::Value, ApiError> {
    let key = state
        .config
        .news_api
        .key
        .as_deref()
        .ok_or_else(|| ApiError::Config("News API key missing in environment".into()))?;

    let url = format!("{}/top-headlines", state.config.news_api.base_url);
    let mut query: Vec<(&str, &str)> = vec![("country", country)];
    if let Some(c) = category {
        query.push(("category", c.as_str()));
    }

    // Key goes in a header so it never shows up in error strings or spans.
    let response = state
        .http
        .get(&url)
        .query(&query)
        .header("X-Api-Key", key)
        .send()
        .await
        .map_err(|e| {
            warn!(error = %e, "upstream headline request failed");
            ApiError::Upstream("Failed to fetch external news".into())
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(%status, "upstream headline API returned an error");
        return Err(ApiError::Upstream(format!("News API error: {}", status)));
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| ApiError::Upstream(format!("Invalid upstream response: {}", e)))
}

/// Typed view over a proxied payload for the presenter. Records the upstream
/// shape (`articles: [...]`); anything unparseable is dropped.
pub fn parse_headlines(payload: &serde_json::Value) -> Vec<ExternalHeadline> {
    payload
        .get("articles")
        .and_then(|a| a.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_is_a_config_error() {
        let state = AppState::fake();
        let err = top_headlines(&state, DEFAULT_COUNTRY, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        assert!(err.to_string().contains("API key missing"));
    }

    #[test]
    fn parses_the_upstream_payload_shape() {
        let payload = serde_json::json!({
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {
                    "source": { "id": null, "name": "Example Wire" },
                    "title": "Headline one",
                    "description": "First story",
                    "url": "https://example.com/1",
                    "urlToImage": "https://example.com/1.jpg",
                    "publishedAt": "2024-05-01T10:00:00Z"
                },
                {
                    "source": { "name": "Other Wire" },
                    "title": "Headline two",
                    "description": null,
                    "url": "https://example.com/2"
                }
            ]
        });
        let headlines = parse_headlines(&payload);
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].title.as_deref(), Some("Headline one"));
        assert_eq!(
            headlines[0].source.as_ref().and_then(|s| s.name.as_deref()),
            Some("Example Wire")
        );
        assert_eq!(
            headlines[0].url_to_image.as_deref(),
            Some("https://example.com/1.jpg")
        );
        assert!(headlines[1].description.is_none());
    }

    #[test]
    fn missing_articles_array_yields_empty() {
        assert!(parse_headlines(&serde_json::json!({"status": "error"})).is_empty());
        assert!(parse_headlines(&serde_json::json!({"articles": "nope"})).is_empty());
    }
}
