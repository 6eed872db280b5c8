use async_trait::async_trait;
use clarion_core::{
    CompletionProvider, ModelError, ModelResponse, ToolInvocationRequest, ToolSpec, Turn,
    TurnPayload,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` endpoint.
///
/// One call per [`CompletionProvider::complete`]; retries belong to
/// `clarion_core::ModelInvoker`.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        info!("Creating GeminiProvider: model={model}");
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn try_send(&self, request: &Value) -> Result<ModelResponse, ModelError> {
        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ModelError::Other(format!("request to Gemini failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::from_status(status.as_u16(), &body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Other(format!("invalid Gemini response: {e}")))?;

        Ok(body.into_model_response())
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(
        &self,
        conversation: &[Turn],
        system_instructions: &str,
        tools: Option<&[ToolSpec]>,
    ) -> Result<ModelResponse, ModelError> {
        let request = build_request(conversation, system_instructions, tools);
        debug!(
            "Sending request to Gemini: model={}, turns={}",
            self.model,
            conversation.len()
        );
        let response = self.try_send(&request).await?;
        debug!("Received response from Gemini");
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn build_request(
    conversation: &[Turn],
    system_instructions: &str,
    tools: Option<&[ToolSpec]>,
) -> Value {
    let contents: Vec<Value> = conversation.iter().map(turn_to_content).collect();
    let mut request = json!({ "contents": contents });

    if !system_instructions.is_empty() {
        request["systemInstruction"] = json!({ "parts": [{ "text": system_instructions }] });
    }

    if let Some(tools) = tools.filter(|t| !t.is_empty()) {
        let declarations: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                })
            })
            .collect();
        request["tools"] = json!([{ "functionDeclarations": declarations }]);
    }

    request
}

fn turn_to_content(turn: &Turn) -> Value {
    match &turn.payload {
        TurnPayload::Text(text) => {
            let role = match turn.role {
                clarion_core::Role::Assistant => "model",
                _ => "user",
            };
            json!({ "role": role, "parts": [{ "text": text }] })
        }
        TurnPayload::ToolRequests(requests) => {
            let parts: Vec<Value> = requests
                .iter()
                .map(|r| json!({ "functionCall": { "name": r.name, "args": r.args } }))
                .collect();
            json!({ "role": "model", "parts": parts })
        }
        TurnPayload::ToolResults(results) => {
            let parts: Vec<Value> = results
                .iter()
                .map(|r| {
                    let response = match &r.error {
                        Some(error) => json!({ "error": error }),
                        None => json!({ "result": r.payload }),
                    };
                    json!({ "functionResponse": { "name": r.name, "response": response } })
                })
                .collect();
            json!({ "role": "user", "parts": parts })
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

impl GenerateResponse {
    fn into_model_response(self) -> ModelResponse {
        let parts = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        let mut calls = Vec::new();
        let mut text = String::new();
        for part in parts {
            if let Some(call) = part.function_call {
                calls.push(ToolInvocationRequest::new(call.name, call.args));
            } else if let Some(t) = part.text {
                text.push_str(&t);
            }
        }

        if !calls.is_empty() {
            ModelResponse::ToolInvocationBatch(calls)
        } else if text.trim().is_empty() {
            ModelResponse::Empty
        } else {
            ModelResponse::FinalText(text)
        }
    }
}
