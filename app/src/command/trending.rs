use clarion_config::Config;
use clarion_core::TrendingChecker;

use super::Services;

#[derive(Debug, Clone)]
pub struct TrendingInput {
    pub country: Option<String>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct TrendingStrategy;

impl super::CommandStrategy for TrendingStrategy {
    type Input = TrendingInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        // No model call here, so a missing model key is fine.
        let config = Config::resolve()?;
        let services = Services::from_config(&config, None)?;
        let checker = TrendingChecker::new(services.trending, services.fact_checks);

        let country = input
            .country
            .unwrap_or_else(|| config.sources.trending_country.clone());
        let max_results = input
            .max_results
            .unwrap_or(config.sources.trending_max_results);

        let items = checker.trending(&country, max_results).await?;
        if items.is_empty() {
            println!("No trending headlines for {country}.");
            return Ok(());
        }

        for item in items {
            println!("{}. [{}] {}", item.id, item.verdict, item.title);
            println!("   {} | {}", item.source, item.published_date);
            if item.fact_check_source != "N/A" {
                println!("   {}: {}", item.fact_check_source, item.summary);
            }
        }
        Ok(())
    }
}
