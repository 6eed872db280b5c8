//! Append-only conversation history owned by a single agent run.

use serde::{Deserialize, Serialize};

use crate::{Role, ToolInvocationRequest, ToolResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TurnPayload {
    Text(String),
    ToolRequests(Vec<ToolInvocationRequest>),
    ToolResults(Vec<ToolResult>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub payload: TurnPayload,
}

impl Turn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            payload: TurnPayload::Text(text.into()),
        }
    }
}

/// Ordered turns of one run. Turns can be appended but never edited or removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    /// Start a conversation whose only turn is the user's prompt.
    #[must_use]
    pub fn seeded(prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user(prompt)],
        }
    }

    pub fn push_assistant_text(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::Assistant,
            payload: TurnPayload::Text(text.into()),
        });
    }

    pub fn push_tool_requests(&mut self, requests: Vec<ToolInvocationRequest>) {
        self.turns.push(Turn {
            role: Role::Assistant,
            payload: TurnPayload::ToolRequests(requests),
        });
    }

    /// Append a complete tool-result batch as a single turn.
    pub fn push_tool_results(&mut self, results: Vec<ToolResult>) {
        self.turns.push(Turn {
            role: Role::ToolResult,
            payload: TurnPayload::ToolResults(results),
        });
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Every tool result recorded so far, in dispatch order.
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.turns.iter().flat_map(|turn| match &turn.payload {
            TurnPayload::ToolResults(results) => results.as_slice(),
            _ => &[],
        })
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
