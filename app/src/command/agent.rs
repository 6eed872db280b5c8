use std::sync::Arc;

use clarion_config::Config;
use clarion_core::util::DEFAULT_AGENT_TASK;
use clarion_core::{AgentLoop, AgentOutcome};
use clarion_tools::default_registry;
use tracing::info;

use super::{Services, cancel_on_ctrl_c};

#[derive(Debug, Clone)]
pub struct AgentInput {
    /// Initial instruction; defaults to the US trend-monitoring task
    pub prompt: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    pub transcript: bool,
}

/// Strategy for one autonomous monitoring run.
///
/// Exits with an error for every outcome other than a final answer.
#[derive(Debug, Clone, Copy)]
pub struct AgentStrategy;

impl super::CommandStrategy for AgentStrategy {
    type Input = AgentInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let services = Services::from_config(&config, input.model)?;

        let registry = default_registry(
            Arc::clone(&services.trending),
            Arc::clone(&services.fact_checks),
            Arc::clone(&services.articles),
        );
        info!("Registered tools: {}", registry.list().join(", "));

        let agent = AgentLoop::new(
            services.invoker(&config),
            Arc::new(registry),
            config.agent_config(),
        );

        let prompt = input
            .prompt
            .unwrap_or_else(|| DEFAULT_AGENT_TASK.to_string());
        println!("--- Project Clarion Agent Initiated ---");
        let run = agent.run_with_cancel(&prompt, cancel_on_ctrl_c()).await;

        if input.transcript {
            println!("{}", serde_json::to_string_pretty(&run.conversation)?);
        }

        match &run.outcome {
            AgentOutcome::FinalAnswer(text) => {
                println!("\n--- AGENT FINAL VERDICT ---");
                println!("{text}");
            }
            AgentOutcome::Exhausted { steps } => {
                println!(
                    "[STATUS] Step limit reached after {steps} model calls without a final verdict."
                );
            }
            AgentOutcome::Aborted { reason } => {
                println!("[STATUS] {reason}. Agent finished early.");
            }
            AgentOutcome::Cancelled { reason } => {
                println!("[STATUS] Run cancelled: {reason}.");
            }
        }

        if !run.outcome.is_success() {
            anyhow::bail!(
                "Agent run {} ended with {} after {} model call(s)",
                run.run_id,
                run.outcome.label(),
                run.model_calls
            );
        }
        Ok(())
    }
}
