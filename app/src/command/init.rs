use clarion_config::Config;

/// Strategy for writing the configuration template to `~/clarion/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let path = Config::create_config()?;

        println!("Created config file at: {}", path.display());
        println!();
        println!("Next steps:");
        println!("   1. Set GEMINI_API_KEY (environment, .env, or model.api_key in the file)");
        println!("   2. Optionally set GOOGLE_FACT_CHECK_KEY and NEWSDATA_API_KEY");
        println!("   3. Run 'clarion agent' or 'clarion serve'");
        Ok(())
    }
}
