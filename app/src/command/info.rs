use clarion_config::{Config, mask_secret};

/// Strategy for displaying the effective configuration, keys masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let path = Config::config_path()?;
        let config = Config::resolve()?;

        println!("=== clarion Configuration ===\n");
        println!(
            "Config file: {}{}",
            path.display(),
            if path.exists() { "" } else { " (missing, using defaults)" }
        );
        println!();

        println!("Model:");
        println!("  Name: {}", config.model.name);
        println!("  Base URL: {}", config.model.base_url);
        println!("  API Key: {}", mask_secret(&config.model.api_key));
        println!();

        println!("Sources:");
        println!(
            "  Fact Check Key: {}",
            mask_secret(config.sources.fact_check_api_key.as_deref().unwrap_or(""))
        );
        println!(
            "  NewsData Key: {}",
            mask_secret(config.sources.newsdata_api_key.as_deref().unwrap_or(""))
        );
        println!("  Trending Country: {}", config.sources.trending_country);
        println!(
            "  Trending Max Results: {}",
            config.sources.trending_max_results
        );
        println!(
            "  Request Timeout: {}s",
            config.sources.request_timeout_secs
        );
        println!();

        println!("Agent:");
        println!("  Max Steps: {}", config.agent.max_steps);
        if config.agent.run_timeout_secs == 0 {
            println!("  Run Timeout: (none)");
        } else {
            println!("  Run Timeout: {}s", config.agent.run_timeout_secs);
        }
        println!("  Max Articles: {}", config.agent.max_articles);
        println!(
            "  Custom Agent Prompt: {}",
            config.agent.system_prompt.is_some()
        );
        println!();

        println!("Retry:");
        println!("  Max Retries: {}", config.retry.max_retries);
        println!("  Base Delay: {}ms", config.retry.base_delay_ms);
        println!();

        println!("Server:");
        println!("  Bind: {}", config.server.bind_address());
        println!(
            "  Allowed Origins: {}",
            config.server.allowed_origins.join(", ")
        );

        Ok(())
    }
}
