use async_trait::async_trait;
use clarion_core::{ClaimReview, FactCheckSource};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://factchecktools.googleapis.com/v1alpha1";

/// Google Fact Check Tools `claims:search`.
///
/// Without an API key every lookup reports "no review found" rather than failing.
pub struct GoogleFactCheck {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GoogleFactCheck {
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
struct SearchResponse {
    #[serde(default)]
    claims: Vec<Claim>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claim {
    text: Option<String>,
    #[serde(default)]
    claim_review: Vec<Review>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Review {
    textual_rating: Option<String>,
    publisher: Option<Publisher>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    name: Option<String>,
}

impl SearchResponse {
    fn into_review(self) -> Option<ClaimReview> {
        let claim = self.claims.into_iter().next()?;
        let review = claim.claim_review.into_iter().next();
        let (rating, publisher) = review.map_or((None, None), |r| {
            (r.textual_rating, r.publisher.and_then(|p| p.name))
        });
        Some(ClaimReview {
            verdict_label: rating.unwrap_or_else(|| "UNCHECKED".to_string()),
            publisher_name: publisher.unwrap_or_else(|| "Unknown".to_string()),
            claim_text: claim.text.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl FactCheckSource for GoogleFactCheck {
    async fn search_claims(&self, claim_text: &str) -> anyhow::Result<Option<ClaimReview>> {
        let Some(api_key) = &self.api_key else {
            debug!("No fact-check API key configured, skipping lookup");
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/claims:search", self.base_url))
            .query(&[
                ("query", claim_text),
                ("languageCode", "en"),
                ("key", api_key.as_str()),
                ("pageSize", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Fact-check API returned HTTP {status}");
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.into_review())
    }
}
