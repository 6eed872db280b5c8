mod registry;

use async_trait::async_trait;

pub use registry::ToolRegistry;

/// Arguments handed to a tool, as the model produced them.
pub type ToolArgs = serde_json::Map<String, serde_json::Value>;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the accepted arguments.
    fn parameters(&self) -> serde_json::Value;
    async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String>;
}
