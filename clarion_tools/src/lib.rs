#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! The tools the monitoring agent may call.

pub mod fact_check;
pub mod news_search;
pub mod trending;

pub use fact_check::FactCheckVerdictTool;
pub use news_search::WeightedNewsSearchTool;
pub use trending::TrendingTopicsTool;

use std::sync::Arc;

use clarion_core::{ArticleSource, FactCheckSource, ToolArgs, ToolRegistry, TrendingSource};
use serde_json::json;

/// Helper to build JSON schema
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn schema_object(properties: serde_json::Value, required: &[&str]) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Read a required, non-empty string argument.
pub fn required_str<'a>(args: &'a ToolArgs, key: &str) -> anyhow::Result<&'a str> {
    match args.get(key) {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(s.trim()),
        Some(serde_json::Value::String(_)) | None => {
            anyhow::bail!("Missing required parameter: {key}")
        }
        Some(other) => anyhow::bail!("Parameter {key} must be a string, got {other}"),
    }
}

/// Registry with the three monitoring tools wired to the given sources.
#[must_use]
pub fn default_registry(
    trending: Arc<dyn TrendingSource>,
    fact_checks: Arc<dyn FactCheckSource>,
    articles: Arc<dyn ArticleSource>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(TrendingTopicsTool::new(trending)));
    registry.register(Arc::new(FactCheckVerdictTool::new(fact_checks)));
    registry.register(Arc::new(WeightedNewsSearchTool::new(articles)));
    registry
}

#[cfg(test)]
pub(crate) mod fakes {
    use async_trait::async_trait;
    use clarion_core::{
        Article, ArticleSource, ClaimReview, FactCheckSource, Headline, TrendingSource,
    };

    pub struct FakeTrending {
        pub fail: bool,
    }

    #[async_trait]
    impl TrendingSource for FakeTrending {
        async fn fetch_top_news(
            &self,
            country_code: &str,
            max_results: usize,
        ) -> anyhow::Result<Vec<Headline>> {
            if self.fail {
                anyhow::bail!("feed unavailable");
            }
            Ok((0..8)
                .take(max_results)
                .map(|i| Headline {
                    title: format!("{country_code} story {i}"),
                    publisher: if i == 0 { "Reuters".to_string() } else { String::new() },
                    url: format!("https://news.example/{i}"),
                    published_date: String::new(),
                })
                .collect())
        }
    }

    pub struct FakeFactChecks;

    #[async_trait]
    impl FactCheckSource for FakeFactChecks {
        async fn search_claims(&self, claim_text: &str) -> anyhow::Result<Option<ClaimReview>> {
            let claim = claim_text.to_lowercase();
            if claim.contains("new bank rule") {
                Ok(Some(ClaimReview {
                    verdict_label: "False".to_string(),
                    publisher_name: "PolitiFact".to_string(),
                    claim_text: "The rule affects only large trusts, not private accounts."
                        .to_string(),
                }))
            } else if claim.contains("outage") {
                anyhow::bail!("fact-check API unreachable")
            } else {
                Ok(None)
            }
        }
    }

    pub struct FakeArticles;

    #[async_trait]
    impl ArticleSource for FakeArticles {
        async fn search_articles(
            &self,
            query: &str,
            max_results: usize,
        ) -> anyhow::Result<Vec<Article>> {
            if query.contains("outage") {
                anyhow::bail!("search backend down");
            }
            if !query.to_lowercase().contains("earthquake aid") {
                return Ok(Vec::new());
            }
            Ok([
                ("Reuters", "Aid is confirmed slow, but convoys moving."),
                ("AP", "Government confirms delays due to weather."),
                ("Local Blog", "Govt is hoarding all the aid, nothing is coming!"),
            ]
            .into_iter()
            .take(max_results)
            .map(|(source, headline)| Article {
                title: headline.to_string(),
                description: format!("{source} coverage"),
                source_name: source.to_string(),
                url: format!("https://{}.example", source.to_lowercase().replace(' ', "-")),
                pub_date: String::new(),
            })
            .collect())
        }
    }
}
