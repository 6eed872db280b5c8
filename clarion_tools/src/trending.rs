use std::sync::Arc;

use async_trait::async_trait;
use clarion_core::{Tool, ToolArgs, TrendingSource};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::{required_str, schema_object};

const MAX_TRENDS: usize = 5;

#[derive(Debug, Serialize)]
struct TrendingClaim {
    id: usize,
    claim_text: String,
    source: String,
}

/// `get_trending_topics`: the current top headlines for a country.
pub struct TrendingTopicsTool {
    source: Arc<dyn TrendingSource>,
}

impl TrendingTopicsTool {
    pub fn new(source: Arc<dyn TrendingSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for TrendingTopicsTool {
    fn name(&self) -> &'static str {
        "get_trending_topics"
    }

    fn description(&self) -> &'static str {
        "Fetches the current top 5 trending news headlines for a specified country \
         (e.g., 'US', 'IN'). Use it to identify emerging claims that need verification."
    }

    fn parameters(&self) -> serde_json::Value {
        schema_object(
            json!({
                "country": {
                    "type": "string",
                    "description": "The two-letter country code for the trend search."
                }
            }),
            &["country"],
        )
    }

    async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
        let country = required_str(args, "country")?;

        // Feed failures are reported to the model, not raised.
        let headlines = match self.source.fetch_top_news(country, MAX_TRENDS).await {
            Ok(headlines) => headlines,
            Err(e) => {
                warn!("Trending fetch failed for {country}: {e:#}");
                return Ok(json!({ "error": format!("Failed to fetch trends: {e:#}") }).to_string());
            }
        };

        let claims: Vec<TrendingClaim> = headlines
            .into_iter()
            .take(MAX_TRENDS)
            .enumerate()
            .map(|(i, h)| TrendingClaim {
                id: i + 1,
                claim_text: h.title,
                source: h.publisher,
            })
            .collect();
        Ok(serde_json::to_string(&claims)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeTrending;

    fn args(country: &str) -> ToolArgs {
        let mut args = ToolArgs::new();
        args.insert("country".to_string(), json!(country));
        args
    }

    #[tokio::test]
    async fn lists_top_five_with_ids() {
        let tool = TrendingTopicsTool::new(Arc::new(FakeTrending { fail: false }));
        let Ok(payload) = tool.execute(&args("US")).await else {
            panic!("tool should succeed");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&payload) else {
            panic!("payload should be JSON");
        };

        let Some(items) = value.as_array() else {
            panic!("expected an array, got {value}");
        };
        assert_eq!(items.len(), 5);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(items[0]["claim_text"], "US story 0");
        assert_eq!(items[0]["source"], "Reuters");
        assert_eq!(items[4]["id"], 5);
    }

    #[tokio::test]
    async fn feed_failure_is_reported_in_payload() {
        let tool = TrendingTopicsTool::new(Arc::new(FakeTrending { fail: true }));
        let Ok(payload) = tool.execute(&args("US")).await else {
            panic!("feed failure should not fail the tool");
        };
        assert!(payload.contains("Failed to fetch trends"));
        assert!(payload.contains("feed unavailable"));
    }

    #[tokio::test]
    async fn missing_country_is_an_error() {
        let tool = TrendingTopicsTool::new(Arc::new(FakeTrending { fail: false }));
        assert!(tool.execute(&ToolArgs::new()).await.is_err());
    }
}
