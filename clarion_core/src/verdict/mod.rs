//! Verdict types and the request/response fact-checking path.

mod assembler;
mod trending;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use assembler::{
    AnalysisStatus, AssembledVerdict, AssemblerConfig, PrimarySource, VerdictAssembler,
};
pub use trending::{TrendingChecker, TrendingItem};

use crate::sources::{Article, FactCheckSource};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictLabel {
    Verified,
    False,
    Misleading,
    NeedsReview,
    Unchecked,
    Error,
    Analyzed,
}

impl VerdictLabel {
    /// Whether an authoritative lookup actually settled the claim.
    #[must_use]
    pub const fn is_decisive(self) -> bool {
        !matches!(self, Self::Unchecked | Self::Error)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::False => "FALSE",
            Self::Misleading => "MISLEADING",
            Self::NeedsReview => "NEEDS_REVIEW",
            Self::Unchecked => "UNCHECKED",
            Self::Error => "ERROR",
            Self::Analyzed => "ANALYZED",
        }
    }

    /// Map a publisher's free-form rating ("Mostly False", "Half True", ...) to a label.
    ///
    /// Negated forms ("Unverified", "Not accurate") are never read as VERIFIED.
    #[must_use]
    pub fn from_rating(rating: &str) -> Self {
        const REVIEW: &[&str] = &[
            "unproven",
            "unsupported",
            "unverified",
            "not verified",
            "unconfirmed",
            "unsubstantiated",
            "needs review",
            "needs_review",
        ];
        const MISLEADING: &[&str] = &[
            "misleading",
            "mixture",
            "mixed",
            "half",
            "partly",
            "partially",
            "missing context",
            "exaggerat",
            "distort",
        ];
        const FALSE: &[&str] = &[
            "false",
            "not true",
            "untrue",
            "pants on fire",
            "incorrect",
            "inaccurate",
            "not accurate",
            "not correct",
            "fake",
            "wrong",
            "hoax",
        ];
        const TRUE: &[&str] = &["true", "correct", "accurate", "verified"];
        const NEGATION: &[&str] = &["not", "no", "never", "cannot", "isn't", "wasn't"];

        let rating = rating.trim().to_lowercase();
        if rating.is_empty() || rating == "unchecked" {
            return Self::Unchecked;
        }
        if rating == "error" {
            return Self::Error;
        }
        if rating == "analyzed" {
            return Self::Analyzed;
        }

        let has = |markers: &[&str]| markers.iter().any(|m| rating.contains(m));
        let words: Vec<&str> = rating
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|w| !w.is_empty())
            .collect();
        let has_word = |markers: &[&str]| words.iter().any(|w| markers.contains(w));

        if has(REVIEW) {
            Self::NeedsReview
        } else if has(MISLEADING) {
            Self::Misleading
        } else if has(FALSE) {
            Self::False
        } else if has_word(TRUE) {
            if has_word(NEGATION) {
                Self::False
            } else {
                Self::Verified
            }
        } else {
            Self::NeedsReview
        }
    }

    /// Pick the verdict a model wrote into its analysis.
    ///
    /// Labels match as whole upper-case words. When the text has a
    /// `Verdict:` line, only the text after it is searched; otherwise the
    /// earliest label anywhere wins.
    #[must_use]
    pub fn from_analysis(text: &str) -> Option<Self> {
        let scope = text
            .to_ascii_lowercase()
            .find("verdict:")
            .and_then(|pos| text.get(pos..))
            .unwrap_or(text);

        [
            ("NEEDS_REVIEW", Self::NeedsReview),
            ("NEEDS REVIEW", Self::NeedsReview),
            ("MISLEADING", Self::Misleading),
            ("VERIFIED", Self::Verified),
            ("FALSE", Self::False),
        ]
        .into_iter()
        .filter_map(|(marker, label)| find_word(scope, marker).map(|pos| (pos, label)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, label)| label)
    }
}

/// Byte offset of the first occurrence of `word` not embedded in a longer word.
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    haystack.match_indices(word).map(|(pos, _)| pos).find(|&pos| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + word.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

impl std::fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled outcome from one source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    #[serde(rename = "verdict")]
    pub label: VerdictLabel,
    /// Who produced the verdict, e.g. a fact-check publisher or the model name.
    pub source: String,
    pub summary: String,
    /// The rating text exactly as the source wrote it, when it differs from the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Article>,
}

impl Verdict {
    #[must_use]
    pub fn unchecked() -> Self {
        Self {
            label: VerdictLabel::Unchecked,
            source: "N/A".to_string(),
            summary: "No previous fact-check found".to_string(),
            rating: None,
            evidence: Vec::new(),
        }
    }

    #[must_use]
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            label: VerdictLabel::Error,
            source: "N/A".to_string(),
            summary: format!("Error checking: {message}"),
            rating: None,
            evidence: Vec::new(),
        }
    }
}

/// Consult the authoritative fact-check database. Never fails: a missing
/// review is UNCHECKED and a source failure is ERROR.
pub async fn lookup_authoritative(source: &dyn FactCheckSource, claim: &str) -> Verdict {
    match source.search_claims(claim).await {
        Ok(Some(review)) => {
            let label = VerdictLabel::from_rating(&review.verdict_label);
            let rating = (review.verdict_label != label.as_str()).then_some(review.verdict_label);
            Verdict {
                label,
                source: review.publisher_name,
                summary: if review.claim_text.is_empty() {
                    "No summary available".to_string()
                } else {
                    review.claim_text
                },
                rating,
                evidence: Vec::new(),
            }
        }
        Ok(None) => Verdict::unchecked(),
        Err(e) => {
            warn!("Fact-check lookup failed for {claim:?}: {e:#}");
            Verdict::error(format!("{e:#}"))
        }
    }
}
