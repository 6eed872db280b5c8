#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Parser, Subcommand};
use command::{
    AgentInput, AgentStrategy, CheckInput, CheckStrategy, CommandStrategy, InfoStrategy,
    InitStrategy, ServeInput, ServeStrategy, TrendingInput, TrendingStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "clarion")]
#[command(about = "Project Clarion misinformation monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the autonomous monitoring agent
    Agent {
        /// Initial instruction for the agent
        #[arg(short = 'p', long)]
        prompt: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Print the full run transcript as JSON
        #[arg(long)]
        transcript: bool,
    },
    /// Fact-check a single claim
    Check {
        /// The claim to verify
        claim: String,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// List trending headlines with their fact-check verdicts
    Trending {
        /// Two-letter country code
        #[arg(short, long)]
        country: Option<String>,

        /// Number of headlines
        #[arg(short = 'n', long)]
        max_results: Option<usize>,
    },
    /// Start the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Initialize configuration
    Init,
    /// Show effective configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Agent {
            prompt,
            model,
            transcript,
        } => {
            AgentStrategy
                .execute(AgentInput {
                    prompt,
                    model,
                    transcript,
                })
                .await?;
        }
        Commands::Check { claim, json } => {
            CheckStrategy.execute(CheckInput { claim, json }).await?;
        }
        Commands::Trending {
            country,
            max_results,
        } => {
            TrendingStrategy
                .execute(TrendingInput {
                    country,
                    max_results,
                })
                .await?;
        }
        Commands::Serve { host, port } => {
            ServeStrategy.execute(ServeInput { host, port }).await?;
        }
        Commands::Init => InitStrategy.execute(()).await?,
        Commands::Info => InfoStrategy.execute(()).await?,
        Commands::Version => VersionStrategy.execute(()).await?,
    }

    Ok(())
}
