use std::sync::Arc;

use clarion_config::Config;
use clarion_core::{PrimarySource, VerdictAssembler};

use super::{Services, cancel_on_ctrl_c};

#[derive(Debug, Clone)]
pub struct CheckInput {
    pub claim: String,
    pub json: bool,
}

/// Strategy for checking one claim, the same way `POST /api/fact-check` does.
#[derive(Debug, Clone, Copy)]
pub struct CheckStrategy;

impl super::CommandStrategy for CheckStrategy {
    type Input = CheckInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let claim = input.claim.trim();
        if claim.is_empty() {
            anyhow::bail!("Claim must not be empty");
        }

        let config = Config::load()?;
        let services = Services::from_config(&config, None)?;
        let assembler = VerdictAssembler::new(
            services.invoker(&config),
            Arc::clone(&services.fact_checks),
            Arc::clone(&services.articles),
            config.assembler_config(),
        );

        let verdict = assembler.assemble(claim, &cancel_on_ctrl_c()).await;

        if input.json {
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            return Ok(());
        }

        let primary = &verdict.primary_verdict;
        let basis = match verdict.primary_source {
            PrimarySource::Authoritative => "existing fact-check",
            PrimarySource::ModelAnalysis => "model analysis",
        };
        println!("Claim:   {}", verdict.claim);
        println!("Verdict: {} ({basis}, {})", primary.label, primary.source);
        if let Some(rating) = &primary.rating {
            println!("Rating:  {rating}");
        }
        println!(
            "Fact-check database: {} ({})",
            verdict.authoritative.label, verdict.authoritative.summary
        );
        println!("\nAnalysis:\n{}", verdict.analysis);

        println!("\nSupporting articles ({}):", verdict.articles_count);
        for (i, article) in verdict.supporting_articles.iter().enumerate() {
            println!("  {}. {} - {}", i + 1, article.title, article.source_name);
            if !article.url.is_empty() {
                println!("     {}", article.url);
            }
        }
        Ok(())
    }
}
