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

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod agent;
pub mod conversation;
pub mod error;
pub mod retry;
pub mod sources;
pub mod tools;
pub mod util;
pub mod verdict;

pub use agent::{AgentConfig, AgentLoop, AgentOutcome, AgentRun};
pub use conversation::{ConversationState, Turn, TurnPayload};
pub use error::ModelError;
pub use retry::{ModelInvoker, RetryPolicy, RetryState};
pub use sources::{Article, ArticleSource, ClaimReview, FactCheckSource, Headline, TrendingSource};
pub use tools::{Tool, ToolArgs, ToolRegistry};
pub use verdict::{
    AnalysisStatus, AssembledVerdict, AssemblerConfig, PrimarySource, TrendingChecker,
    TrendingItem, Verdict, VerdictAssembler, VerdictLabel,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    User,
    Assistant,
    ToolResult,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInvocationRequest {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Map<String, serde_json::Value>,
}

impl ToolInvocationRequest {
    #[must_use]
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        let args = match args {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Outcome of dispatching one [`ToolInvocationRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolResult {
    pub name: String,
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
            error: None,
        }
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            name: name.into(),
            payload: serde_json::json!({ "error": message }).to_string(),
            error: Some(message),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Tool declaration handed to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// What the model produced for one completion call.
///
/// Providers translate their wire format into this tag; the agent loop
/// dispatches on it and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    ToolInvocationBatch(Vec<ToolInvocationRequest>),
    FinalText(String),
    Empty,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        conversation: &[conversation::Turn],
        system_instructions: &str,
        tools: Option<&[ToolSpec]>,
    ) -> Result<ModelResponse, ModelError>;

    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: CompletionProvider + ?Sized> CompletionProvider for Arc<T> {
    async fn complete(
        &self,
        conversation: &[conversation::Turn],
        system_instructions: &str,
        tools: Option<&[ToolSpec]>,
    ) -> Result<ModelResponse, ModelError> {
        (**self)
            .complete(conversation, system_instructions, tools)
            .await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
