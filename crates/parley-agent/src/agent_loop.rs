//! Agent loop: the model ↔ tool-calling conversation driver.
//!
//! One `chat()` call appends the user's text, then repeatedly calls the
//! model with the whole transcript until a response arrives that requests no
//! tools. Assistant text is handed to the listener as it arrives; tool calls
//! are dispatched and their results appended before the next round-trip.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use parley_core::types::{FunctionCallItem, OutputItem, ToolSpec, Turn};
use parley_providers::{ModelProvider, ProviderError};

use crate::tools::registry::{ToolDispatcher, ToolSource};

/// Supplies the system prompt; called before every round-trip.
pub type SystemPromptFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Receives each assistant text block, in the order the model produced them.
pub type MessageListenerFn = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model provider failed: {0}")]
    Provider(#[from] ProviderError),

    /// The configured cap was hit while the model still wanted tools.
    #[error("stopped after {0} round-trips with tool calls still pending")]
    RoundTripLimit(usize),
}

// ─────────────────────────────────────────────
// ConversationAgent
// ─────────────────────────────────────────────

/// Owns one linear transcript and drives the request/response/tool loop.
pub struct ConversationAgent {
    provider: Arc<dyn ModelProvider>,
    system_prompt: SystemPromptFn,
    tools: Arc<dyn ToolSource>,
    listener: MessageListenerFn,
    /// Upper bound on round-trips per `chat()`; `None` is unbounded.
    max_round_trips: Option<usize>,
    /// Append-only.
    transcript: Vec<Turn>,
}

impl ConversationAgent {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        system_prompt: SystemPromptFn,
        tools: Arc<dyn ToolSource>,
        listener: MessageListenerFn,
    ) -> Self {
        info!(
            provider = provider.display_name(),
            model = provider.model(),
            "conversation agent initialized"
        );

        Self {
            provider,
            system_prompt,
            tools,
            listener,
            max_round_trips: None,
            transcript: Vec::new(),
        }
    }

    /// Cap the number of model round-trips a single `chat()` may take.
    pub fn with_max_round_trips(mut self, limit: Option<usize>) -> Self {
        self.max_round_trips = limit;
        self
    }

    /// Every turn so far, oldest first.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Send one user message and drive the model until it stops calling tools.
    ///
    /// Tool failures are reported back to the model, never returned here.
    /// A provider error ends the call; turns appended so far are kept.
    pub async fn chat(&mut self, text: impl Into<String>) -> Result<(), AgentError> {
        let text = text.into();
        debug!(len = text.len(), "user message");
        self.transcript.push(Turn::user(text));

        let mut round_trips = 0usize;

        loop {
            round_trips += 1;

            let instructions = (self.system_prompt)();
            let specs: Vec<ToolSpec> = self
                .tools
                .tools()
                .iter()
                .map(|tool| tool.spec().clone())
                .collect();

            debug!(
                round_trip = round_trips,
                turns = self.transcript.len(),
                tools = specs.len(),
                "calling model"
            );

            let items = self
                .provider
                .respond(&self.transcript, &instructions, &specs)
                .await?;

            for item in &items {
                match item {
                    OutputItem::Message(message) => {
                        for text in message.texts() {
                            (self.listener)(text);
                        }
                    }
                    OutputItem::FunctionCall(_) => {}
                    OutputItem::Other(_) => {
                        debug!(kind = item.kind(), "ignoring output item");
                    }
                }
            }

            let turn = Turn::Assistant { items };
            let pending: Vec<FunctionCallItem> =
                turn.function_calls().into_iter().cloned().collect();
            self.transcript.push(turn);

            if pending.is_empty() {
                debug!(round_trips, "model finished");
                return Ok(());
            }

            let dispatcher = ToolDispatcher::snapshot(self.tools.as_ref());
            for call in &pending {
                let response = dispatcher.dispatch(call).await;
                self.transcript
                    .push(Turn::tool_result(call.call_id.clone(), response.to_output()));
            }

            if let Some(limit) = self.max_round_trips {
                if round_trips >= limit {
                    warn!(limit, pending = pending.len(), "round-trip limit reached");
                    return Err(AgentError::RoundTripLimit(limit));
                }
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::tools::builder::{handler, ToolSpecBuilder};
    use crate::tools::registry::ToolRegistry;
    use parley_core::types::{PrimitiveType, ToolResponse};

    /// What the agent sent on one round-trip.
    #[derive(Debug, Clone)]
    struct RecordedCall {
        transcript: Vec<Turn>,
        instructions: String,
        tool_names: Vec<String>,
    }

    /// A mock provider that returns scripted outputs and records requests.
    struct MockProvider {
        responses: Mutex<Vec<Result<Vec<OutputItem>, ProviderError>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockProvider {
        fn new(responses: Vec<Result<Vec<OutputItem>, ProviderError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn scripted(outputs: Vec<Vec<OutputItem>>) -> Self {
            Self::new(outputs.into_iter().map(Ok).collect())
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelProvider for MockProvider {
        async fn respond(
            &self,
            transcript: &[Turn],
            instructions: &str,
            tools: &[ToolSpec],
        ) -> Result<Vec<OutputItem>, ProviderError> {
            self.calls.lock().unwrap().push(RecordedCall {
                transcript: transcript.to_vec(),
                instructions: instructions.to_string(),
                tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            });

            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(vec![OutputItem::message("(no more responses)")])
            } else {
                responses.remove(0)
            }
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        fn display_name(&self) -> &str {
            "MockProvider"
        }
    }

    async fn get_blog_posts(args: Value) -> anyhow::Result<ToolResponse> {
        let limit = crate::tools::base::require_i64(&args, "limit")?;
        Ok(ToolResponse::ok(json!({ "title": "Comisar Rex", "limit": limit })))
    }

    async fn broken(_args: Value) -> anyhow::Result<ToolResponse> {
        anyhow::bail!("database offline")
    }

    fn blog_registry() -> Arc<ToolRegistry> {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(ToolSpecBuilder::tool(
            "getBlogPosts",
            "Retrieve blog posts",
            vec![ToolSpecBuilder::parameter(
                "limit",
                PrimitiveType::Integer,
                "Maximum number of blog posts to retrieve",
                true,
            )],
            handler(get_blog_posts),
        )));
        registry.register(Arc::new(ToolSpecBuilder::tool(
            "broken",
            "Always errors",
            Vec::new(),
            handler(broken),
        )));
        registry
    }

    /// Agent plus the texts its listener received.
    fn create_agent(
        provider: Arc<MockProvider>,
        tools: Arc<ToolRegistry>,
    ) -> (ConversationAgent, Arc<Mutex<Vec<String>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let agent = ConversationAgent::new(
            provider,
            Arc::new(|| "You are a helpful AI assistant.".to_string()),
            tools,
            Arc::new(move |text: &str| sink.lock().unwrap().push(text.to_string())),
        );
        (agent, received)
    }

    fn tool_result_outputs(transcript: &[Turn]) -> Vec<(String, Value)> {
        transcript
            .iter()
            .filter_map(|turn| match turn {
                Turn::ToolResult { call_id, output } => {
                    Some((call_id.clone(), serde_json::from_str(output).unwrap()))
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_plain_reply_single_round_trip() {
        let provider = Arc::new(MockProvider::scripted(vec![vec![OutputItem::message(
            "Hello from Parley!",
        )]]));
        let (mut agent, received) = create_agent(provider.clone(), blog_registry());

        agent.chat("Hi").await.unwrap();

        assert_eq!(provider.calls().len(), 1);
        assert_eq!(agent.transcript().len(), 2);
        assert_eq!(agent.transcript()[0], Turn::user("Hi"));
        assert!(matches!(agent.transcript()[1], Turn::Assistant { .. }));
        assert_eq!(*received.lock().unwrap(), vec!["Hello from Parley!"]);
    }

    #[tokio::test]
    async fn test_single_tool_call_two_round_trips() {
        let provider = Arc::new(MockProvider::scripted(vec![
            vec![OutputItem::function_call("call_1", "getBlogPosts", r#"{"limit":1}"#)],
            vec![OutputItem::message("The latest post is Comisar Rex.")],
        ]));
        let (mut agent, received) = create_agent(provider.clone(), blog_registry());

        agent.chat("What's the latest post?").await.unwrap();

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        // Second request carries the call and its result
        assert_eq!(calls[1].transcript.len(), 3);
        assert_eq!(
            calls[1].transcript[2],
            Turn::tool_result(
                "call_1",
                r#"{"success":true,"content":{"limit":1,"title":"Comisar Rex"}}"#
            )
        );

        assert_eq!(agent.transcript().len(), 4);
        assert_eq!(*received.lock().unwrap(), vec!["The latest post is Comisar Rex."]);
    }

    #[tokio::test]
    async fn test_parallel_calls_results_in_order() {
        let provider = Arc::new(MockProvider::scripted(vec![
            vec![
                OutputItem::function_call("call_a", "getBlogPosts", r#"{"limit":1}"#),
                OutputItem::function_call("call_b", "unknownTool", "{}"),
                OutputItem::function_call("call_c", "broken", "{}"),
            ],
            vec![OutputItem::message("Done")],
        ]));
        let (mut agent, _) = create_agent(provider.clone(), blog_registry());

        agent.chat("go").await.unwrap();

        let results = tool_result_outputs(agent.transcript());
        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["call_a", "call_b", "call_c"]);

        assert_eq!(results[0].1["success"], true);
        assert_eq!(
            results[1].1,
            json!({ "success": false, "content": "function_id not found" })
        );
        assert_eq!(results[2].1["success"], false);
        assert!(results[2].1["message"].as_str().unwrap().contains("database offline"));

        // All three results precede the second request
        assert_eq!(provider.calls()[1].transcript.len(), 5);
    }

    #[tokio::test]
    async fn test_unknown_tool_exact_output() {
        let provider = Arc::new(MockProvider::scripted(vec![
            vec![OutputItem::function_call("call_x", "nope", "{}")],
            vec![OutputItem::message("ok")],
        ]));
        let (mut agent, _) = create_agent(provider, blog_registry());

        agent.chat("try it").await.unwrap();

        assert_eq!(
            agent.transcript()[2],
            Turn::tool_result("call_x", r#"{"success":false,"content":"function_id not found"}"#)
        );
    }

    #[tokio::test]
    async fn test_malformed_arguments_do_not_abort() {
        let provider = Arc::new(MockProvider::scripted(vec![
            vec![OutputItem::function_call("call_1", "getBlogPosts", "{limit:")],
            vec![OutputItem::message("Sorry about that.")],
        ]));
        let (mut agent, received) = create_agent(provider.clone(), blog_registry());

        agent.chat("posts?").await.unwrap();

        let results = tool_result_outputs(agent.transcript());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1["success"], false);
        assert_eq!(provider.calls().len(), 2);
        assert_eq!(*received.lock().unwrap(), vec!["Sorry about that."]);
    }

    #[tokio::test]
    async fn test_text_and_calls_in_one_response() {
        let provider = Arc::new(MockProvider::scripted(vec![
            vec![
                OutputItem::message("Let me check."),
                OutputItem::function_call("call_1", "getBlogPosts", r#"{"limit":2}"#),
            ],
            vec![OutputItem::message("Found it.")],
        ]));
        let (mut agent, received) = create_agent(provider, blog_registry());

        agent.chat("check").await.unwrap();

        assert_eq!(*received.lock().unwrap(), vec!["Let me check.", "Found it."]);
    }

    #[tokio::test]
    async fn test_unknown_item_kinds_kept_but_ignored() {
        let reasoning =
            OutputItem::Other(json!({ "type": "reasoning", "id": "rs_1", "summary": [] }));
        let provider = Arc::new(MockProvider::scripted(vec![vec![
            reasoning.clone(),
            OutputItem::message("Answer"),
        ]]));
        let (mut agent, received) = create_agent(provider, blog_registry());

        agent.chat("think").await.unwrap();

        match &agent.transcript()[1] {
            Turn::Assistant { items } => assert_eq!(items[0], reasoning),
            other => panic!("Expected assistant turn, got {other:?}"),
        }
        assert_eq!(*received.lock().unwrap(), vec!["Answer"]);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(MockProvider::new(vec![Err(ProviderError::Api {
            status: 500,
            body: "internal".into(),
        })]));
        let (mut agent, received) = create_agent(provider, blog_registry());

        let err = agent.chat("Hi").await.unwrap_err();

        assert!(matches!(err, AgentError::Provider(ProviderError::Api { status: 500, .. })));
        // The user turn stays; nothing was emitted
        assert_eq!(agent.transcript(), &[Turn::user("Hi")]);
        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_limit() {
        let looping = || vec![OutputItem::function_call("call", "getBlogPosts", r#"{"limit":1}"#)];
        let provider = Arc::new(MockProvider::scripted(vec![looping(), looping(), looping()]));
        let (agent, _) = create_agent(provider.clone(), blog_registry());
        let mut agent = agent.with_max_round_trips(Some(2));

        let err = agent.chat("loop").await.unwrap_err();

        assert!(matches!(err, AgentError::RoundTripLimit(2)));
        assert_eq!(provider.calls().len(), 2);
        // Results for the last batch were still appended
        assert!(matches!(agent.transcript().last(), Some(Turn::ToolResult { .. })));
    }

    #[tokio::test]
    async fn test_prompt_and_tools_refetched_each_round_trip() {
        let provider = Arc::new(MockProvider::scripted(vec![
            vec![OutputItem::message("first")],
            vec![OutputItem::message("second")],
        ]));
        let registry = Arc::new(ToolRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let prompt_counter = counter.clone();

        let mut agent = ConversationAgent::new(
            provider.clone(),
            Arc::new(move || format!("prompt #{}", prompt_counter.fetch_add(1, Ordering::SeqCst))),
            registry.clone(),
            Arc::new(|_: &str| {}),
        );

        agent.chat("one").await.unwrap();
        registry.register(blog_registry().get("getBlogPosts").unwrap());
        agent.chat("two").await.unwrap();

        let calls = provider.calls();
        assert_eq!(calls[0].instructions, "prompt #0");
        assert_eq!(calls[1].instructions, "prompt #1");
        assert!(calls[0].tool_names.is_empty());
        assert_eq!(calls[1].tool_names, vec!["getBlogPosts"]);
        // The transcript accumulates across chats
        assert_eq!(calls[1].transcript.len(), 3);
    }
}
