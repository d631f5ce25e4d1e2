//! HTTP provider for the OpenAI Responses API (`POST {base}/responses`).
//!
//! Converts the typed transcript into Responses API input items, sends the
//! current instructions and tool definitions with every call, and parses the
//! `output` array back into [`OutputItem`]s.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use parley_core::config::schema::ProviderConfig;
use parley_core::types::{OutputItem, ToolSpec, Turn};

use crate::error::ProviderError;
use crate::traits::ModelProvider;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

/// Request body for `POST /responses`.
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<Value>,
    instructions: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    text: TextOptions<'a>,
}

#[derive(Debug, Serialize)]
struct TextOptions<'a> {
    format: TextFormat,
    verbosity: &'a str,
}

#[derive(Debug, Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// The parts of a response body the agent needs.
#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    error: Option<ResponseError>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Flatten the transcript into Responses API input items.
///
/// User turns become `input_text` messages, assistant turns contribute their
/// items verbatim, tool results become `function_call_output` items.
pub fn to_input_items(transcript: &[Turn]) -> Vec<Value> {
    let mut input = Vec::with_capacity(transcript.len());
    for turn in transcript {
        match turn {
            Turn::User { text } => input.push(json!({
                "role": "user",
                "content": [{ "type": "input_text", "text": text }],
            })),
            Turn::Assistant { items } => {
                for item in items {
                    // OutputItem serialization is infallible for well-formed items
                    if let Ok(value) = serde_json::to_value(item) {
                        input.push(value);
                    }
                }
            }
            Turn::ToolResult { call_id, output } => input.push(json!({
                "type": "function_call_output",
                "call_id": call_id,
                "output": output,
            })),
        }
    }
    input
}

// ─────────────────────────────────────────────
// ResponsesProvider
// ─────────────────────────────────────────────

/// Talks to a Responses API endpoint with bearer authentication.
pub struct ResponsesProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    api_key: String,
    model: String,
    /// Text verbosity hint sent with every request.
    verbosity: String,
}

impl std::fmt::Debug for ResponsesProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponsesProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl ResponsesProvider {
    /// Create a provider from config.
    pub fn new(
        config: &ProviderConfig,
        model: impl Into<String>,
        verbosity: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(ResponsesProvider {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            model: model.into(),
            verbosity: verbosity.into(),
        })
    }

    /// Full `/responses` URL.
    fn responses_url(&self) -> String {
        format!("{}/responses", self.api_base.trim_end_matches('/'))
    }

    fn build_request<'a>(
        &'a self,
        transcript: &[Turn],
        instructions: &'a str,
        tools: &[ToolSpec],
    ) -> ResponsesRequest<'a> {
        ResponsesRequest {
            model: &self.model,
            input: to_input_items(transcript),
            instructions,
            tools: tools.iter().map(ToolSpec::to_definition).collect(),
            text: TextOptions {
                format: TextFormat { kind: "text" },
                verbosity: &self.verbosity,
            },
        }
    }
}

#[async_trait]
impl ModelProvider for ResponsesProvider {
    async fn respond(
        &self,
        transcript: &[Turn],
        instructions: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<OutputItem>, ProviderError> {
        let body = self.build_request(transcript, instructions, tools);

        debug!(
            model = %self.model,
            input_items = body.input.len(),
            tools = body.tools.len(),
            "calling Responses API"
        );

        let response = self
            .client
            .post(self.responses_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %body, "Responses API error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        if let Some(err) = parsed.error {
            let code = err.code.as_deref().unwrap_or("unknown");
            error!(code, message = %err.message, "response reported failure");
            return Err(ProviderError::Failed(format!("{code}: {}", err.message)));
        }

        debug!(
            id = parsed.id.as_deref().unwrap_or("?"),
            status = parsed.status.as_deref().unwrap_or("?"),
            items = parsed.output.len(),
            "Responses API output received"
        );

        Ok(parsed.output)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        "OpenAI Responses"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
