use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::Tool;
use crate::{ToolInvocationRequest, ToolResult, ToolSpec};

/// Fixed mapping from tool name to tool.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        info!("Registering tool: {}", tool.name());
        self.tools.insert(tool.name().to_string(), tool);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Run one request. Always yields exactly one result; an unknown name or a
    /// failing tool produces an error-shaped result instead of an `Err`.
    pub async fn execute(&self, request: &ToolInvocationRequest) -> ToolResult {
        let Some(tool) = self.tools.get(&request.name) else {
            warn!("Model requested unknown tool: {}", request.name);
            return ToolResult::error(&request.name, format!("Unknown tool: {}", request.name));
        };

        match tool.execute(&request.args).await {
            Ok(payload) => ToolResult::success(&request.name, payload),
            Err(e) => {
                warn!("Tool {} failed: {e:#}", request.name);
                ToolResult::error(&request.name, format!("{e:#}"))
            }
        }
    }

    #[must_use]
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .values()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters(),
            })
            .collect()
    }

    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolArgs;
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the text argument"
        }

        fn parameters(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
            args.get("text")
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string)
                .ok_or_else(|| anyhow::anyhow!("Missing required parameter: text"))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo));
        registry
    }

    #[tokio::test]
    async fn executes_registered_tool() {
        let result = registry()
            .execute(&ToolInvocationRequest::new("echo", json!({"text": "hi"})))
            .await;
        assert_eq!(result, ToolResult::success("echo", "hi"));
    }

    #[tokio::test]
    async fn unknown_tool_is_error_result() {
        let result = registry()
            .execute(&ToolInvocationRequest::new("nope", json!({})))
            .await;
        assert!(result.is_error());
        assert_eq!(result.name, "nope");
        assert!(result.payload.contains("Unknown tool: nope"));
    }

    #[tokio::test]
    async fn tool_failure_is_error_result() {
        let result = registry()
            .execute(&ToolInvocationRequest::new("echo", json!({})))
            .await;
        assert_eq!(
            result.error.as_deref(),
            Some("Missing required parameter: text")
        );
    }

    #[test]
    fn specs_list_registered_tools() {
        let specs = registry().specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "echo");
        assert_eq!(specs[0].parameters["type"], "object");
    }
}
