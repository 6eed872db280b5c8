use async_trait::async_trait;
use clarion_core::{Article, ArticleSource};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://newsdata.io/api/1";

/// NewsData.io `latest` endpoint, used for corroborating coverage.
pub struct NewsData {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl NewsData {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "source_name")]
    source_name: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Self {
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            source_name: raw.source_name.unwrap_or_default(),
            url: raw.link.unwrap_or_default(),
            pub_date: raw.pub_date.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ArticleSource for NewsData {
    async fn search_articles(
        &self,
        query: &str,
        max_results: usize,
    ) -> anyhow::Result<Vec<Article>> {
        let Some(api_key) = &self.api_key else {
            debug!("No NewsData API key configured, skipping article search");
            return Ok(Vec::new());
        };

        let response = self
            .client
            .get(format!("{}/latest", self.base_url))
            .query(&[
                ("apikey", api_key.as_str()),
                ("q", query),
                ("language", "en"),
                ("size", &max_results.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("NewsData returned HTTP {status}");
        }

        let body: LatestResponse = response.json().await?;
        if body.status != "success" {
            anyhow::bail!("NewsData reported status {:?}", body.status);
        }

        Ok(body
            .results
            .into_iter()
            .take(max_results)
            .map(Article::from)
            .collect())
    }
}
