//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use std::sync::Arc;

use clarion_config::Config;
use clarion_core::{
    ArticleSource, CompletionProvider, FactCheckSource, ModelInvoker, TrendingSource,
};
use clarion_providers::{
    GeminiProvider, GoogleFactCheck, GoogleNewsTrending, NewsData, build_client,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod agent;
mod check;
mod info;
mod init;
mod serve;
mod trending;
mod version;

pub use agent::{AgentInput, AgentStrategy};
pub use check::{CheckInput, CheckStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use trending::{TrendingInput, TrendingStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via the associated type, so
/// parameters are passed without runtime casting or boxing.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// The external collaborators every command is built from.
struct Services {
    model: Arc<dyn CompletionProvider>,
    trending: Arc<dyn TrendingSource>,
    fact_checks: Arc<dyn FactCheckSource>,
    articles: Arc<dyn ArticleSource>,
}

impl Services {
    fn from_config(config: &Config, model_override: Option<String>) -> anyhow::Result<Self> {
        let client = build_client(config.request_timeout())?;
        let model_name = model_override.unwrap_or_else(|| config.model.name.clone());
        info!("Using model {model_name}");

        let model = GeminiProvider::new(config.model.api_key.clone(), model_name)
            .with_base_url(config.model.base_url.clone())
            .with_client(client.clone());

        Ok(Self {
            model: Arc::new(model),
            trending: Arc::new(GoogleNewsTrending::new(client.clone())),
            fact_checks: Arc::new(GoogleFactCheck::new(
                client.clone(),
                config.sources.fact_check_api_key.clone(),
            )),
            articles: Arc::new(NewsData::new(
                client,
                config.sources.newsdata_api_key.clone(),
            )),
        })
    }

    fn invoker(&self, config: &Config) -> ModelInvoker<Arc<dyn CompletionProvider>> {
        ModelInvoker::new(Arc::clone(&self.model), config.retry_policy())
    }
}

/// A token cancelled by the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, cancelling");
                trigger.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {e}"),
        }
    });
    token
}
