//! Contracts for the external information sources.
//!
//! Implementations live in `clarion_providers`; everything in this crate only
//! sees these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A trending news headline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub publisher: String,
    pub url: String,
    pub published_date: String,
}

/// The best prior fact-check found for a claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimReview {
    /// Rating as the publisher wrote it, e.g. "Mostly False".
    pub verdict_label: String,
    pub publisher_name: String,
    pub claim_text: String,
}

/// A news article used as corroborating evidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
    #[serde(rename = "source")]
    pub source_name: String,
    pub url: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
}

#[async_trait]
pub trait TrendingSource: Send + Sync {
    async fn fetch_top_news(
        &self,
        country_code: &str,
        max_results: usize,
    ) -> anyhow::Result<Vec<Headline>>;
}

#[async_trait]
pub trait FactCheckSource: Send + Sync {
    /// `Ok(None)` means the database has no review for this claim.
    async fn search_claims(&self, claim_text: &str) -> anyhow::Result<Option<ClaimReview>>;
}

#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn search_articles(&self, query: &str, max_results: usize)
    -> anyhow::Result<Vec<Article>>;
}
