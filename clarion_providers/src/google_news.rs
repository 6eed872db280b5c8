use anyhow::Context;
use async_trait::async_trait;
use clarion_core::{Headline, TrendingSource};
use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://news.google.com";

/// Top stories from the Google News RSS feed for a country.
pub struct GoogleNewsTrending {
    client: Client,
    base_url: String,
}

impl GoogleNewsTrending {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Google News titles read "Headline - Publisher".
fn headline_from_entry(entry: Entry) -> Option<Headline> {
    let title = entry.title.map(|t| t.content)?.trim().to_string();
    if title.is_empty() {
        return None;
    }
    let publisher = title
        .rsplit_once(" - ")
        .map(|(_, p)| p.trim().to_string())
        .unwrap_or_default();
    let url = entry
        .links
        .into_iter()
        .next()
        .map(|l| l.href)
        .unwrap_or_default();
    let published_date = entry
        .published
        .map(|d| d.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_default();

    Some(Headline {
        title,
        publisher,
        url,
        published_date,
    })
}

#[async_trait]
impl TrendingSource for GoogleNewsTrending {
    async fn fetch_top_news(
        &self,
        country_code: &str,
        max_results: usize,
    ) -> anyhow::Result<Vec<Headline>> {
        let country = country_code.trim().to_uppercase();
        let response = self
            .client
            .get(format!("{}/rss", self.base_url))
            .query(&[
                ("hl", format!("en-{country}")),
                ("gl", country.clone()),
                ("ceid", format!("{country}:en")),
            ])
            .send()
            .await
            .context("network error fetching news feed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("news feed returned HTTP {status}");
        }

        let bytes = response
            .bytes()
            .await
            .context("failed to read feed body")?;
        let feed = parser::parse(bytes.as_ref()).context("failed to parse feed")?;
        debug!("Parsed news feed with {} entries", feed.entries.len());

        Ok(feed
            .entries
            .into_iter()
            .filter_map(headline_from_entry)
            .take(max_results)
            .collect())
    }
}
