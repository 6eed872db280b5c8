use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clarion_core::{ArticleSource, Tool, ToolArgs};
use serde::Serialize;
use serde_json::json;

use super::{required_str, schema_object};

const MAX_ARTICLES: usize = 5;

#[derive(Debug, Serialize)]
struct CorroborationArticle {
    source: String,
    headline: String,
    description: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct SearchPayload {
    corroboration_articles: Vec<CorroborationArticle>,
}

/// `search_weighted_news`: corroborating or refuting coverage from trusted outlets.
pub struct WeightedNewsSearchTool {
    source: Arc<dyn ArticleSource>,
}

impl WeightedNewsSearchTool {
    pub fn new(source: Arc<dyn ArticleSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for WeightedNewsSearchTool {
    fn name(&self) -> &'static str {
        "search_weighted_news"
    }

    fn description(&self) -> &'static str {
        "Searches trusted news sources for evidence corroborating or refuting a claim. \
         Use it when no official fact-check is found."
    }

    fn parameters(&self) -> serde_json::Value {
        schema_object(
            json!({
                "query": {
                    "type": "string",
                    "description": "The topic or claim to search for."
                }
            }),
            &["query"],
        )
    }

    async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
        let query = required_str(args, "query")?;
        let articles = self
            .source
            .search_articles(query, MAX_ARTICLES)
            .await
            .context("News search failed")?;

        let payload = SearchPayload {
            corroboration_articles: articles
                .into_iter()
                .map(|a| CorroborationArticle {
                    source: a.source_name,
                    headline: a.title,
                    description: a.description,
                    url: a.url,
                })
                .collect(),
        };
        Ok(serde_json::to_string(&payload)?)
    }
}
