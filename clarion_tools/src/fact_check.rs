use std::sync::Arc;

use async_trait::async_trait;
use clarion_core::verdict::lookup_authoritative;
use clarion_core::{FactCheckSource, Tool, ToolArgs};
use serde_json::json;

use super::{required_str, schema_object};

/// `get_fact_check_verdict`: look for an existing professional fact-check.
pub struct FactCheckVerdictTool {
    source: Arc<dyn FactCheckSource>,
}

impl FactCheckVerdictTool {
    pub fn new(source: Arc<dyn FactCheckSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for FactCheckVerdictTool {
    fn name(&self) -> &'static str {
        "get_fact_check_verdict"
    }

    fn description(&self) -> &'static str {
        "Queries the Google Fact Check Tools database for pre-existing credibility ratings. \
         This is the highest-confidence source for an immediate verdict."
    }

    fn parameters(&self) -> serde_json::Value {
        schema_object(
            json!({
                "claim_text": {
                    "type": "string",
                    "description": "The specific factual claim or short headline to verify."
                }
            }),
            &["claim_text"],
        )
    }

    async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
        let claim = required_str(args, "claim_text")?;
        let verdict = lookup_authoritative(self.source.as_ref(), claim).await;

        let payload = if verdict.label.is_decisive() {
            json!({
                "verdict": verdict.label,
                "source": verdict.source,
                "summary": verdict.summary,
            })
        } else {
            json!({
                "verdict": "UNCHECKED",
                "reason": "No previous fact-check found in the database.",
            })
        };
        Ok(payload.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeFactChecks;

    async fn run(claim: &str) -> serde_json::Value {
        let tool = FactCheckVerdictTool::new(Arc::new(FakeFactChecks));
        let mut args = ToolArgs::new();
        args.insert("claim_text".to_string(), json!(claim));
        let Ok(payload) = tool.execute(&args).await else {
            panic!("tool should succeed for {claim:?}");
        };
        serde_json::from_str(&payload).unwrap_or_default()
    }

    #[tokio::test]
    async fn reports_existing_verdict() {
        let value = run("Is the new bank rule real?").await;
        assert_eq!(value["verdict"], "FALSE");
        assert_eq!(value["source"], "PolitiFact");
        assert_eq!(
            value["summary"],
            "The rule affects only large trusts, not private accounts."
        );
    }

    #[tokio::test]
    async fn unknown_claim_is_unchecked() {
        let value = run("Moon made of cheese").await;
        assert_eq!(value["verdict"], "UNCHECKED");
        assert_eq!(value["reason"], "No previous fact-check found in the database.");
    }

    #[tokio::test]
    async fn source_failure_is_unchecked() {
        let value = run("service outage claim").await;
        assert_eq!(value["verdict"], "UNCHECKED");
    }
}
