use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{Verdict, VerdictLabel, lookup_authoritative};
use crate::sources::{Article, ArticleSource, FactCheckSource};
use crate::util::DEFAULT_ANALYSIS_PROMPT;
use crate::{CompletionProvider, ModelError, ModelInvoker};

#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    pub max_articles: usize,
    pub system_prompt: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            max_articles: 5,
            system_prompt: DEFAULT_ANALYSIS_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrimarySource {
    Authoritative,
    ModelAnalysis,
}

/// Whether the model analysis is real or a degraded placeholder.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Ok,
    RateLimited,
    PermissionDenied,
    Failed,
}

/// Response of the fact-check API. Both verdicts are always present.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledVerdict {
    pub claim: String,
    pub verdict: VerdictLabel,
    pub analysis: String,
    pub analysis_status: AnalysisStatus,
    pub supporting_articles: Vec<Article>,
    pub articles_count: usize,
    #[serde(rename = "google_fact_check")]
    pub authoritative: Verdict,
    pub model_verdict: Verdict,
    pub primary_source: PrimarySource,
    pub primary_verdict: Verdict,
}

pub struct VerdictAssembler<P = Arc<dyn CompletionProvider>>
where
    P: CompletionProvider,
{
    invoker: ModelInvoker<P>,
    fact_checks: Arc<dyn FactCheckSource>,
    articles: Arc<dyn ArticleSource>,
    config: AssemblerConfig,
}

impl<P> VerdictAssembler<P>
where
    P: CompletionProvider,
{
    pub fn new(
        invoker: ModelInvoker<P>,
        fact_checks: Arc<dyn FactCheckSource>,
        articles: Arc<dyn ArticleSource>,
        config: AssemblerConfig,
    ) -> Self {
        Self {
            invoker,
            fact_checks,
            articles,
            config,
        }
    }

    /// Fact-check `claim`: authoritative lookup, fresh corroborating articles,
    /// then model analysis. Source and model failures degrade, never fail.
    pub async fn assemble(&self, claim: &str, cancel: &CancellationToken) -> AssembledVerdict {
        let authoritative = lookup_authoritative(self.fact_checks.as_ref(), claim).await;
        info!(
            "Authoritative verdict for {claim:?}: {} ({})",
            authoritative.label, authoritative.source
        );

        let supporting_articles = self.corroborating_articles(claim).await;

        let prompt = analysis_prompt(claim, &supporting_articles);
        let (analysis, analysis_status) = match self
            .invoker
            .invoke_text(&prompt, &self.config.system_prompt, cancel)
            .await
        {
            Ok(text) => (text, AnalysisStatus::Ok),
            Err(e) => {
                warn!("Model analysis failed for {claim:?}: {e}");
                degraded_analysis(&e)
            }
        };

        let model_label = match analysis_status {
            AnalysisStatus::Ok => {
                VerdictLabel::from_analysis(&analysis).unwrap_or(VerdictLabel::NeedsReview)
            }
            _ => VerdictLabel::NeedsReview,
        };
        let model_verdict = Verdict {
            label: model_label,
            source: format!("model:{}", self.invoker.model_name()),
            summary: analysis.clone(),
            rating: None,
            evidence: supporting_articles.clone(),
        };

        let (primary_source, primary_verdict) = if authoritative.label.is_decisive() {
            (PrimarySource::Authoritative, authoritative.clone())
        } else {
            (PrimarySource::ModelAnalysis, model_verdict.clone())
        };

        AssembledVerdict {
            claim: claim.to_string(),
            verdict: VerdictLabel::Analyzed,
            analysis,
            analysis_status,
            articles_count: supporting_articles.len(),
            supporting_articles,
            authoritative,
            model_verdict,
            primary_source,
            primary_verdict,
        }
    }

    async fn corroborating_articles(&self, claim: &str) -> Vec<Article> {
        match self
            .articles
            .search_articles(claim, self.config.max_articles)
            .await
        {
            Ok(mut articles) => {
                articles.truncate(self.config.max_articles);
                articles
            }
            Err(e) => {
                warn!("Corroborating article search failed for {claim:?}: {e:#}");
                Vec::new()
            }
        }
    }
}

/// Build the user prompt for the model-analysis step.
#[must_use]
pub fn analysis_prompt(claim: &str, articles: &[Article]) -> String {
    let articles_text = if articles.is_empty() {
        "No articles found.".to_string()
    } else {
        articles
            .iter()
            .enumerate()
            .map(|(i, a)| {
                format!(
                    "Article {}:\nTitle: {}\nSource: {}\nDescription: {}",
                    i + 1,
                    a.title,
                    a.source_name,
                    a.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        "Claim to fact-check: \"{claim}\"\n\nSupporting Articles:\n{articles_text}\n\nProvide your fact-check verdict and explanation."
    )
}

/// Placeholder analysis for a failed model call, worded per failure class.
#[must_use]
pub fn degraded_analysis(error: &ModelError) -> (String, AnalysisStatus) {
    match error {
        ModelError::RateLimited(_) => (
            "AI analysis temporarily unavailable due to rate limits. Please try again in a few moments.\n\nBased on the articles found, please review the sources manually for now."
                .to_string(),
            AnalysisStatus::RateLimited,
        ),
        ModelError::PermissionDenied(_) => (
            "AI analysis unavailable - API key issue. Please check your Gemini API key.\n\nBased on the articles found, please review the sources manually."
                .to_string(),
            AnalysisStatus::PermissionDenied,
        ),
        other => (
            format!(
                "AI analysis unavailable: {other}\n\nBased on the articles found, please review the sources manually."
            ),
            AnalysisStatus::Failed,
        ),
    }
}
