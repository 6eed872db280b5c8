//! Bounded model/tool loop for the autonomous agent mode.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::util::{DEFAULT_AGENT_PROMPT, truncate_for_log};
use crate::{
    CompletionProvider, ConversationState, ModelError, ModelInvoker, ModelResponse,
    ToolInvocationRequest, ToolRegistry, ToolResult,
};

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Hard cap on model invocations per run.
    pub max_steps: usize,
    pub system_prompt: String,
    /// Wall-clock budget for a whole run. `None` disables the deadline.
    pub run_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 7,
            system_prompt: DEFAULT_AGENT_PROMPT.to_string(),
            run_timeout: None,
        }
    }
}

/// How a run terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// The model answered with text and no tool requests.
    FinalAnswer(String),
    /// The step bound was reached before a final answer.
    Exhausted { steps: usize },
    /// The model returned nothing usable, or failed unrecoverably.
    Aborted { reason: String },
    /// The caller cancelled the run or its deadline passed.
    Cancelled { reason: String },
}

impl AgentOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::FinalAnswer(_))
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FinalAnswer(_) => "FINAL_ANSWER",
            Self::Exhausted { .. } => "EXHAUSTED",
            Self::Aborted { .. } => "ABORTED",
            Self::Cancelled { .. } => "CANCELLED",
        }
    }
}

/// Result of one run, including the full transcript.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub run_id: Uuid,
    pub outcome: AgentOutcome,
    pub conversation: ConversationState,
    pub model_calls: usize,
}

enum LoopState {
    AwaitingModelResponse,
    DispatchingTools(Vec<ToolInvocationRequest>),
    Done(AgentOutcome),
}

pub struct AgentLoop<P = Arc<dyn CompletionProvider>>
where
    P: CompletionProvider,
{
    invoker: ModelInvoker<P>,
    registry: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl<P> AgentLoop<P>
where
    P: CompletionProvider,
{
    pub const fn new(
        invoker: ModelInvoker<P>,
        registry: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            invoker,
            registry,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub async fn run(&self, prompt: &str) -> AgentRun {
        self.run_with_cancel(prompt, CancellationToken::new())
            .await
    }

    /// Drive the conversation until a final answer, the step bound, an
    /// unrecoverable model error, or cancellation.
    pub async fn run_with_cancel(&self, prompt: &str, cancel: CancellationToken) -> AgentRun {
        let run_id = Uuid::now_v7();
        info!(
            "[{run_id}] Agent run started (model={}, max_steps={})",
            self.invoker.model_name(),
            self.config.max_steps
        );

        let run_token = cancel.child_token();
        let deadline = self.spawn_deadline(&run_token);
        let specs = self.registry.specs();

        let mut conversation = ConversationState::seeded(prompt);
        let mut model_calls = 0_usize;
        let mut state = LoopState::AwaitingModelResponse;

        let outcome = loop {
            state = match state {
                LoopState::AwaitingModelResponse => {
                    if model_calls >= self.config.max_steps {
                        LoopState::Done(AgentOutcome::Exhausted { steps: model_calls })
                    } else if run_token.is_cancelled() {
                        LoopState::Done(AgentOutcome::Cancelled {
                            reason: cancel_reason(&cancel),
                        })
                    } else {
                        // Counts calls that reached the provider; retries do not count.
                        model_calls += 1;
                        debug!("[{run_id}] Model call {model_calls}/{}", self.config.max_steps);
                        let response = self
                            .invoker
                            .invoke(
                                conversation.turns(),
                                &self.config.system_prompt,
                                Some(&specs),
                                &run_token,
                            )
                            .await;
                        Self::on_model_response(response, &mut conversation, &cancel)
                    }
                }
                LoopState::DispatchingTools(requests) => {
                    let results = self.dispatch(run_id, &requests, &run_token).await;
                    conversation.push_tool_requests(requests);
                    conversation.push_tool_results(results);
                    if run_token.is_cancelled() {
                        LoopState::Done(AgentOutcome::Cancelled {
                            reason: cancel_reason(&cancel),
                        })
                    } else {
                        LoopState::AwaitingModelResponse
                    }
                }
                LoopState::Done(outcome) => break outcome,
            };
        };

        if let Some(deadline) = deadline {
            deadline.abort();
        }

        match &outcome {
            AgentOutcome::FinalAnswer(text) => {
                info!(
                    "[{run_id}] Final verdict after {model_calls} model call(s): {}",
                    truncate_for_log(text, 200)
                );
            }
            other => warn!("[{run_id}] Agent run ended without verdict: {other:?}"),
        }

        AgentRun {
            run_id,
            outcome,
            conversation,
            model_calls,
        }
    }

    fn on_model_response(
        response: Result<ModelResponse, ModelError>,
        conversation: &mut ConversationState,
        cancel: &CancellationToken,
    ) -> LoopState {
        match response {
            Ok(ModelResponse::ToolInvocationBatch(requests)) if !requests.is_empty() => {
                LoopState::DispatchingTools(requests)
            }
            Ok(ModelResponse::FinalText(text)) if !text.trim().is_empty() => {
                conversation.push_assistant_text(text.clone());
                LoopState::Done(AgentOutcome::FinalAnswer(text))
            }
            Ok(_) => LoopState::Done(AgentOutcome::Aborted {
                reason: "No response text or tool call detected".to_string(),
            }),
            Err(ModelError::Cancelled) => LoopState::Done(AgentOutcome::Cancelled {
                reason: cancel_reason(cancel),
            }),
            Err(e) => LoopState::Done(AgentOutcome::Aborted {
                reason: format!("Model invocation failed: {e}"),
            }),
        }
    }

    /// Execute one batch sequentially; one result per request, in order.
    ///
    /// After cancellation the interrupted tool and every tool not yet started
    /// get an error result instead of running.
    async fn dispatch(
        &self,
        run_id: Uuid,
        requests: &[ToolInvocationRequest],
        cancel: &CancellationToken,
    ) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            if cancel.is_cancelled() {
                results.push(ToolResult::error(&request.name, TOOL_CANCELLED));
                continue;
            }
            info!(
                "[{run_id}] Calling tool: {} with args: {}",
                request.name,
                serde_json::Value::Object(request.args.clone())
            );
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => ToolResult::error(&request.name, TOOL_CANCELLED),
                result = self.registry.execute(request) => result,
            };
            debug!(
                "[{run_id}] Tool {} returned: {}",
                result.name,
                truncate_for_log(&result.payload, 500)
            );
            results.push(result);
        }
        results
    }

    fn spawn_deadline(&self, run_token: &CancellationToken) -> Option<JoinHandle<()>> {
        let timeout = self.config.run_timeout?;
        let token = run_token.clone();
        Some(tokio::spawn(async move {
            sleep(timeout).await;
            token.cancel();
        }))
    }
}

const TOOL_CANCELLED: &str = "Cancelled before the tool finished";

fn cancel_reason(caller: &CancellationToken) -> String {
    if caller.is_cancelled() {
        "Cancelled by caller".to_string()
    } else {
        "Run deadline exceeded".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Turn, TurnPayload};
    use crate::tools::{Tool, ToolArgs};
    use crate::{Role, RetryPolicy, ToolSpec};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays scripted responses, then falls back to `fallback`.
    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<ModelResponse, ModelError>>>,
        fallback: Option<ModelResponse>,
        seen: Mutex<Vec<Vec<Turn>>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<ModelResponse, ModelError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn repeating(response: ModelResponse) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback: Some(response),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().map(|s| s.len()).unwrap_or_default()
        }

        fn seen(&self) -> Vec<Vec<Turn>> {
            self.seen.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(
            &self,
            conversation: &[Turn],
            _system_instructions: &str,
            _tools: Option<&[ToolSpec]>,
        ) -> Result<ModelResponse, ModelError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(conversation.to_vec());
            }
            let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
            match (next, &self.fallback) {
                (Some(step), _) => step,
                (None, Some(fallback)) => Ok(fallback.clone()),
                (None, None) => Ok(ModelResponse::Empty),
            }
        }

        fn model_name(&self) -> &'static str {
            "scripted"
        }
    }

    /// Never answers; used for deadline tests.
    struct HangingProvider;

    #[async_trait]
    impl CompletionProvider for HangingProvider {
        async fn complete(
            &self,
            _conversation: &[Turn],
            _system_instructions: &str,
            _tools: Option<&[ToolSpec]>,
        ) -> Result<ModelResponse, ModelError> {
            std::future::pending().await
        }

        fn model_name(&self) -> &'static str {
            "hanging"
        }
    }

    struct CountingTool {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &'static str {
            "get_fact_check_verdict"
        }

        fn description(&self) -> &'static str {
            "Look up a claim"
        }

        fn parameters(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {"claim_text": {"type": "string"}}})
        }

        async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"verdict": "UNCHECKED", "claim": args.get("claim_text")}).to_string())
        }
    }

    /// Never finishes.
    struct StuckTool;

    #[async_trait]
    impl Tool for StuckTool {
        fn name(&self) -> &'static str {
            "get_trending_topics"
        }

        fn description(&self) -> &'static str {
            "Fetch trending topics"
        }

        fn parameters(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _args: &ToolArgs) -> anyhow::Result<String> {
            std::future::pending().await
        }
    }

    fn lookup(claim: &str) -> ToolInvocationRequest {
        ToolInvocationRequest::new("get_fact_check_verdict", json!({"claim_text": claim}))
    }

    fn agent(
        provider: Arc<ScriptedProvider>,
        tool_calls: &Arc<AtomicUsize>,
    ) -> AgentLoop<Arc<ScriptedProvider>> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CountingTool {
            calls: tool_calls.clone(),
        }));
        AgentLoop::new(
            ModelInvoker::new(provider, RetryPolicy::default()),
            Arc::new(registry),
            AgentConfig::default(),
        )
    }

    #[tokio::test]
    async fn final_text_ends_run() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(ModelResponse::FinalText(
            "Verdict: False".to_string(),
        ))]));
        let run = agent(provider.clone(), &Arc::new(AtomicUsize::new(0)))
            .run("check")
            .await;

        assert_eq!(run.outcome, AgentOutcome::FinalAnswer("Verdict: False".to_string()));
        assert_eq!(run.model_calls, 1);
        assert_eq!(run.conversation.len(), 2);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn tool_results_are_appended_as_complete_batch() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(ModelResponse::ToolInvocationBatch(vec![
                lookup("new bank rule"),
                lookup("tax cut passed"),
            ])),
            Ok(ModelResponse::FinalText("done".to_string())),
        ]));
        let tool_calls = Arc::new(AtomicUsize::new(0));
        let run = agent(provider.clone(), &tool_calls).run("check").await;

        assert!(run.outcome.is_success());
        assert_eq!(tool_calls.load(Ordering::SeqCst), 2);

        let seen = provider.seen();
        let second = &seen[1];
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].role, Role::Assistant);
        let Some(last) = second.last() else {
            panic!("history should not be empty");
        };
        assert_eq!(last.role, Role::ToolResult);
        let TurnPayload::ToolResults(results) = &last.payload else {
            panic!("expected tool results, got {:?}", last.payload);
        };
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.is_error()));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_and_loop_continues() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(ModelResponse::ToolInvocationBatch(vec![
                ToolInvocationRequest::new("launch_rockets", json!({})),
                lookup("x"),
            ])),
            Ok(ModelResponse::FinalText("still answered".to_string())),
        ]));
        let tool_calls = Arc::new(AtomicUsize::new(0));
        let run = agent(provider, &tool_calls).run("check").await;

        assert_eq!(run.outcome, AgentOutcome::FinalAnswer("still answered".to_string()));
        assert_eq!(tool_calls.load(Ordering::SeqCst), 1);
        let results: Vec<_> = run.conversation.tool_results().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_error());
        assert!(!results[1].is_error());
    }

    #[tokio::test]
    async fn never_exceeds_step_bound() {
        let provider = Arc::new(ScriptedProvider::repeating(
            ModelResponse::ToolInvocationBatch(vec![lookup("again")]),
        ));
        let tool_calls = Arc::new(AtomicUsize::new(0));
        let run = agent(provider.clone(), &tool_calls).run("loop forever").await;

        assert_eq!(run.outcome, AgentOutcome::Exhausted { steps: 7 });
        assert!(!run.outcome.is_success());
        assert_eq!(provider.calls(), 7);
        assert_eq!(run.model_calls, 7);
        assert_eq!(tool_calls.load(Ordering::SeqCst), 7);
        // Every dispatched request has exactly one result.
        assert_eq!(run.conversation.tool_results().count(), 7);
    }

    #[tokio::test]
    async fn empty_response_aborts() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(ModelResponse::Empty)]));
        let run = agent(provider, &Arc::new(AtomicUsize::new(0)))
            .run("check")
            .await;

        let AgentOutcome::Aborted { reason } = run.outcome else {
            panic!("expected abort, got {:?}", run.outcome);
        };
        assert!(reason.contains("No response text or tool call detected"));
    }

    #[tokio::test]
    async fn blank_text_and_empty_batch_abort() {
        for response in [
            ModelResponse::FinalText("   ".to_string()),
            ModelResponse::ToolInvocationBatch(Vec::new()),
        ] {
            let provider = Arc::new(ScriptedProvider::new(vec![Ok(response)]));
            let run = agent(provider, &Arc::new(AtomicUsize::new(0)))
                .run("check")
                .await;
            assert_eq!(run.outcome.label(), "ABORTED");
        }
    }

    #[tokio::test]
    async fn permanent_model_error_aborts() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(
            ModelError::PermissionDenied("bad key".to_string()),
        )]));
        let run = agent(provider.clone(), &Arc::new(AtomicUsize::new(0)))
            .run("check")
            .await;

        let AgentOutcome::Aborted { reason } = run.outcome else {
            panic!("expected abort");
        };
        assert!(reason.contains("bad key"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_is_retried_within_one_step() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ModelError::RateLimited("429".to_string())),
            Ok(ModelResponse::FinalText("ok".to_string())),
        ]));
        let run = agent(provider.clone(), &Arc::new(AtomicUsize::new(0)))
            .run("check")
            .await;

        assert!(run.outcome.is_success());
        assert_eq!(run.model_calls, 1);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let provider = Arc::new(ScriptedProvider::repeating(ModelResponse::FinalText(
            "never".to_string(),
        )));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let run = agent(provider.clone(), &Arc::new(AtomicUsize::new(0)))
            .run_with_cancel("check", cancel)
            .await;

        assert_eq!(
            run.outcome,
            AgentOutcome::Cancelled {
                reason: "Cancelled by caller".to_string()
            }
        );
        assert_eq!(provider.calls(), 0);
        assert_eq!(run.model_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_stops_hanging_model() {
        let agent = AgentLoop::new(
            ModelInvoker::new(HangingProvider, RetryPolicy::default()),
            Arc::new(ToolRegistry::new()),
            AgentConfig {
                run_timeout: Some(Duration::from_secs(30)),
                ..AgentConfig::default()
            },
        );
        let run = agent.run("check").await;

        assert_eq!(
            run.outcome,
            AgentOutcome::Cancelled {
                reason: "Run deadline exceeded".to_string()
            }
        );
        assert_eq!(run.model_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_during_dispatch_still_records_one_result_per_request() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(
            ModelResponse::ToolInvocationBatch(vec![
                ToolInvocationRequest::new("get_trending_topics", json!({})),
                lookup("never reached"),
            ]),
        )]));
        let tool_calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StuckTool));
        registry.register(Arc::new(CountingTool {
            calls: tool_calls.clone(),
        }));
        let agent = AgentLoop::new(
            ModelInvoker::new(provider.clone(), RetryPolicy::default()),
            Arc::new(registry),
            AgentConfig {
                run_timeout: Some(Duration::from_secs(30)),
                ..AgentConfig::default()
            },
        );
        let run = agent.run("check").await;

        assert_eq!(
            run.outcome,
            AgentOutcome::Cancelled {
                reason: "Run deadline exceeded".to_string()
            }
        );
        assert_eq!(run.model_calls, 1);
        assert_eq!(provider.calls(), 1);
        assert_eq!(tool_calls.load(Ordering::SeqCst), 0);

        let turns = run.conversation.turns();
        assert_eq!(turns.len(), 3);
        let TurnPayload::ToolRequests(requests) = &turns[1].payload else {
            panic!("expected tool requests, got {:?}", turns[1].payload);
        };
        let results: Vec<_> = run.conversation.tool_results().collect();
        assert_eq!(results.len(), requests.len());
        assert!(results.iter().all(|r| r.is_error()));
        assert_eq!(results[0].name, "get_trending_topics");
        assert_eq!(results[1].name, "get_fact_check_verdict");
    }
}
