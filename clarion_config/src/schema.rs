use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clarion_core::util::{DEFAULT_AGENT_PROMPT, DEFAULT_ANALYSIS_PROMPT};
use clarion_core::{AgentConfig, AssemblerConfig, RetryPolicy};
use tracing::{info, warn};

const CONFIG_DIR: &str = "clarion";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "ModelConfig::default_name")]
    pub name: String,
    #[serde(default = "ModelConfig::default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            base_url: Self::default_base_url(),
            api_key: String::new(),
        }
    }
}

impl ModelConfig {
    fn default_name() -> String {
        "gemini-2.0-flash".to_string()
    }

    fn default_base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_check_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newsdata_api_key: Option<String>,
    #[serde(default = "SourcesConfig::default_trending_country")]
    pub trending_country: String,
    #[serde(default = "SourcesConfig::default_trending_max_results")]
    pub trending_max_results: usize,
    #[serde(default = "SourcesConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            fact_check_api_key: None,
            newsdata_api_key: None,
            trending_country: Self::default_trending_country(),
            trending_max_results: Self::default_trending_max_results(),
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

impl SourcesConfig {
    fn default_trending_country() -> String {
        "US".to_string()
    }

    const fn default_trending_max_results() -> usize {
        5
    }

    const fn default_request_timeout_secs() -> u64 {
        10
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentSettings {
    #[serde(default = "AgentSettings::default_max_steps")]
    pub max_steps: usize,
    /// Zero disables the run deadline.
    #[serde(default = "AgentSettings::default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_prompt: Option<String>,
    #[serde(default = "AgentSettings::default_max_articles")]
    pub max_articles: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: Self::default_max_steps(),
            run_timeout_secs: Self::default_run_timeout_secs(),
            system_prompt: None,
            analysis_prompt: None,
            max_articles: Self::default_max_articles(),
        }
    }
}

impl AgentSettings {
    const fn default_max_steps() -> usize {
        7
    }

    const fn default_run_timeout_secs() -> u64 {
        120
    }

    const fn default_max_articles() -> usize {
        5
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetrySettings {
    #[serde(default = "RetrySettings::default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "RetrySettings::default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: Self::default_max_retries(),
            base_delay_ms: Self::default_base_delay_ms(),
        }
    }
}

impl RetrySettings {
    const fn default_max_retries() -> u32 {
        3
    }

    const fn default_base_delay_ms() -> u64 {
        2000
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
    #[serde(default = "ServerConfig::default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            allowed_origins: Self::default_allowed_origins(),
        }
    }
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    const fn default_port() -> u16 {
        8000
    }

    fn default_allowed_origins() -> Vec<String> {
        vec![
            "http://localhost:5173".to_string(),
            "http://localhost:3000".to_string(),
        ]
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

const CONFIG_TEMPLATE: &str = r#"{
  "model": {
    "name": "gemini-2.0-flash",
    "base_url": "https://generativelanguage.googleapis.com/v1beta",
    "api_key": ""
  },
  "sources": {
    "trending_country": "US",
    "trending_max_results": 5,
    "request_timeout_secs": 10
  },
  "agent": {
    "max_steps": 7,
    "run_timeout_secs": 120,
    "max_articles": 5
  },
  "retry": {
    "max_retries": 3,
    "base_delay_ms": 2000
  },
  "server": {
    "host": "0.0.0.0",
    "port": 8000,
    "allowed_origins": ["http://localhost:5173", "http://localhost:3000"]
  }
}
"#;

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Effective configuration: file, then environment. Requires a model key.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::resolve()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`] but without requiring a model key.
    pub fn resolve() -> anyhow::Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `GEMINI_API_KEY`, `NEWSDATA_API_KEY` and `GOOGLE_FACT_CHECK_KEY`.
    pub fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            self.model.api_key = key;
        }
        if let Some(key) = get("NEWSDATA_API_KEY") {
            self.sources.newsdata_api_key = Some(key);
        }
        if let Some(key) = get("GOOGLE_FACT_CHECK_KEY") {
            self.sources.fact_check_api_key = Some(key);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model.api_key.trim().is_empty() {
            anyhow::bail!(
                "GEMINI_API_KEY environment variable not found and no model.api_key in config. \
                 Set it in the environment, a .env file, or run 'clarion init' and edit the config."
            );
        }
        if self.agent.max_steps == 0 {
            anyhow::bail!("agent.max_steps must be at least 1");
        }
        if self.sources.fact_check_api_key.is_none() {
            warn!("GOOGLE_FACT_CHECK_KEY not set; every claim will be UNCHECKED");
        }
        if self.sources.newsdata_api_key.is_none() {
            warn!("NEWSDATA_API_KEY not set; no supporting articles will be found");
        }
        Ok(())
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
        }
    }

    #[must_use]
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            max_steps: self.agent.max_steps,
            system_prompt: self
                .agent
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_AGENT_PROMPT.to_string()),
            run_timeout: (self.agent.run_timeout_secs > 0)
                .then(|| Duration::from_secs(self.agent.run_timeout_secs)),
        }
    }

    #[must_use]
    pub fn assembler_config(&self) -> AssemblerConfig {
        AssemblerConfig {
            max_articles: self.agent.max_articles,
            system_prompt: self
                .agent
                .analysis_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_ANALYSIS_PROMPT.to_string()),
        }
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.request_timeout_secs)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::ensure_config_dir()?.join(CONFIG_FILE);
        Self::create_config_at(&config_path)?;
        Ok(config_path)
    }

    /// Write the template to `path`. Never overwrites.
    pub fn create_config_at(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        info!("Created config file at {}", path.display());
        Ok(())
    }
}

/// Show only the edges of a secret.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        "(not set)".to_string()
    } else if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_uses_defaults() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let Ok(config) = Config::load_from(&dir.path().join("absent.json")) else {
            panic!("missing file should be fine");
        };
        assert_eq!(config.agent.max_steps, 7);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.sources.trending_country, "US");
        assert_eq!(config.server.allowed_origins.len(), 2);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("config.json");
        let written = std::fs::write(
            &path,
            r#"{"model":{"api_key":"file-key"},"retry":{"base_delay_ms":10}}"#,
        );
        assert!(written.is_ok());

        let Ok(config) = Config::load_from(&path) else {
            panic!("partial file should parse");
        };
        assert_eq!(config.model.api_key, "file-key");
        assert_eq!(config.model.name, "gemini-2.0-flash");
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(
            config.retry_policy().delay_for(1),
            Duration::from_millis(20)
        );
    }

    #[test]
    fn invalid_json_names_the_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("config.json");
        assert!(std::fs::write(&path, "{ not json").is_ok());

        let Err(e) = Config::load_from(&path) else {
            panic!("invalid json should fail");
        };
        assert!(e.to_string().contains("Invalid config file"));
    }

    #[test]
    fn env_overrides_file_keys() {
        let mut config = Config::default();
        config.model.api_key = "from-file".to_string();
        config.apply_env_overrides_from(env(&[
            ("GEMINI_API_KEY", "from-env"),
            ("NEWSDATA_API_KEY", "nd"),
            ("GOOGLE_FACT_CHECK_KEY", " "),
        ]));

        assert_eq!(config.model.api_key, "from-env");
        assert_eq!(config.sources.newsdata_api_key.as_deref(), Some("nd"));
        assert!(config.sources.fact_check_api_key.is_none());
    }

    #[test]
    fn validation_requires_model_key() {
        let mut config = Config::default();
        let Err(e) = config.validate() else {
            panic!("empty key should be rejected");
        };
        assert!(e.to_string().contains("GEMINI_API_KEY"));

        config.apply_env_overrides_from(env(&[("GEMINI_API_KEY", "k")]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn template_parses_and_is_not_overwritten() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("nested").join("config.json");

        assert!(Config::create_config_at(&path).is_ok());
        let Ok(config) = Config::load_from(&path) else {
            panic!("template should parse");
        };
        assert_eq!(config.agent.run_timeout_secs, 120);
        assert_eq!(config.server.host, "0.0.0.0");

        let Err(e) = Config::create_config_at(&path) else {
            panic!("second init should refuse");
        };
        assert!(e.to_string().contains("already exists"));
    }

    #[test]
    fn converts_to_core_settings() {
        let mut config = Config::default();
        let agent = config.agent_config();
        assert_eq!(agent.max_steps, 7);
        assert_eq!(agent.run_timeout, Some(Duration::from_secs(120)));
        assert_eq!(agent.system_prompt, DEFAULT_AGENT_PROMPT);

        config.agent.run_timeout_secs = 0;
        assert_eq!(config.agent_config().run_timeout, None);

        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.assembler_config().max_articles, 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn masks_secrets() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret("AIzaSyExampleKey1234"), "AIza...1234");
    }
}
