use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use super::{VerdictLabel, lookup_authoritative};
use crate::sources::{FactCheckSource, TrendingSource};

/// A ranked trending headline with its own authoritative verdict.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrendingItem {
    pub id: usize,
    pub title: String,
    pub source: String,
    pub url: String,
    pub published_date: String,
    pub verdict: VerdictLabel,
    pub summary: String,
    pub fact_check_source: String,
}

pub struct TrendingChecker {
    trending: Arc<dyn TrendingSource>,
    fact_checks: Arc<dyn FactCheckSource>,
}

impl TrendingChecker {
    pub fn new(trending: Arc<dyn TrendingSource>, fact_checks: Arc<dyn FactCheckSource>) -> Self {
        Self {
            trending,
            fact_checks,
        }
    }

    /// Fetch the top headlines for `country` and fact-check each one in turn.
    pub async fn trending(
        &self,
        country: &str,
        max_results: usize,
    ) -> anyhow::Result<Vec<TrendingItem>> {
        let headlines = self
            .trending
            .fetch_top_news(country, max_results)
            .await
            .with_context(|| format!("Failed to fetch trends for {country}"))?;
        info!("Fetched {} trending headline(s) for {country}", headlines.len());

        let mut items = Vec::with_capacity(headlines.len().min(max_results));
        for (rank, headline) in headlines.into_iter().take(max_results).enumerate() {
            let verdict = lookup_authoritative(self.fact_checks.as_ref(), &headline.title).await;
            items.push(TrendingItem {
                id: rank + 1,
                title: headline.title,
                source: if headline.publisher.is_empty() {
                    "Unknown".to_string()
                } else {
                    headline.publisher
                },
                url: headline.url,
                published_date: headline.published_date,
                verdict: verdict.label,
                summary: verdict.summary,
                fact_check_source: verdict.source,
            });
        }
        Ok(items)
    }
}
