use std::sync::Arc;

use clarion_config::Config;
use clarion_core::{TrendingChecker, VerdictAssembler};
use clarion_server::AppState;

use super::{Services, cancel_on_ctrl_c};

#[derive(Debug, Clone)]
pub struct ServeInput {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Strategy for running the HTTP API until Ctrl-C.
#[derive(Debug, Clone, Copy)]
pub struct ServeStrategy;

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(host) = input.host {
            config.server.host = host;
        }
        if let Some(port) = input.port {
            config.server.port = port;
        }

        let services = Services::from_config(&config, None)?;
        let state = AppState {
            assembler: VerdictAssembler::new(
                services.invoker(&config),
                Arc::clone(&services.fact_checks),
                Arc::clone(&services.articles),
                config.assembler_config(),
            ),
            trending: TrendingChecker::new(
                Arc::clone(&services.trending),
                Arc::clone(&services.fact_checks),
            ),
            trending_country: config.sources.trending_country.clone(),
            trending_max_results: config.sources.trending_max_results,
            shutdown: cancel_on_ctrl_c(),
        };

        clarion_server::serve(state, &config.server).await
    }
}
