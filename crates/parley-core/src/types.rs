//! Core types for Parley: the transcript, Responses API output items,
//! tool specs, tool results, and raw schedule intervals.
//!
//! The transcript is modelled as typed turns rather than raw JSON so the
//! agent loop can pattern-match on what the remote service returned. The
//! wire shapes live with the output items: they (de)serialize exactly as the
//! Responses API emits them, and unknown item kinds are kept verbatim.

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// ─────────────────────────────────────────────
// Transcript
// ─────────────────────────────────────────────

/// One entry of the conversation transcript.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Turn {
    /// Text typed by the user (or injected by a scheduler trigger).
    User { text: String },

    /// Everything one remote response produced, in emission order.
    Assistant { items: Vec<OutputItem> },

    /// Result of one tool call, correlated by `call_id`.
    ToolResult {
        call_id: String,
        /// JSON-serialized [`ToolResponse`].
        output: String,
    },
}

impl Turn {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Turn::User { text: text.into() }
    }

    /// Create a tool result turn.
    pub fn tool_result(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Turn::ToolResult {
            call_id: call_id.into(),
            output: output.into(),
        }
    }

    /// Function calls carried by an assistant turn (empty for other turns).
    pub fn function_calls(&self) -> Vec<&FunctionCallItem> {
        match self {
            Turn::Assistant { items } => items
                .iter()
                .filter_map(|item| match item {
                    OutputItem::FunctionCall(call) => Some(call),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────
// Output items (Responses API)
// ─────────────────────────────────────────────

/// An item in a remote response's `output` array.
///
/// `message` and `function_call` are typed; any other kind (reasoning,
/// web search calls, …) is carried as raw JSON so it can be sent back
/// unchanged on the next round-trip.
#[derive(Clone, Debug, PartialEq)]
pub enum OutputItem {
    Message(MessageItem),
    FunctionCall(FunctionCallItem),
    Other(Value),
}

impl OutputItem {
    /// Assistant message with a single `output_text` block.
    pub fn message(text: impl Into<String>) -> Self {
        OutputItem::Message(MessageItem {
            id: None,
            role: default_role(),
            status: None,
            content: vec![ContentBlock::output_text(text)],
        })
    }

    /// Function call item.
    pub fn function_call(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        OutputItem::FunctionCall(FunctionCallItem::new(call_id, name, arguments))
    }

    /// The wire `type` of this item.
    pub fn kind(&self) -> &str {
        match self {
            OutputItem::Message(_) => "message",
            OutputItem::FunctionCall(_) => "function_call",
            OutputItem::Other(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }
}

/// Insert the `type` tag into an already-serialized item.
fn tagged<T: Serialize>(kind: &str, item: &T) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(item)?;
    if let Value::Object(map) = &mut value {
        map.insert("type".to_string(), Value::String(kind.to_string()));
    }
    Ok(value)
}

impl Serialize for OutputItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = match self {
            OutputItem::Message(message) => tagged("message", message),
            OutputItem::FunctionCall(call) => tagged("function_call", call),
            OutputItem::Other(value) => return value.serialize(serializer),
        }
        .map_err(ser::Error::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OutputItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let item = match value.get("type").and_then(Value::as_str) {
            Some("message") => {
                OutputItem::Message(serde_json::from_value(value).map_err(de::Error::custom)?)
            }
            Some("function_call") => {
                OutputItem::FunctionCall(serde_json::from_value(value).map_err(de::Error::custom)?)
            }
            _ => OutputItem::Other(value),
        };
        Ok(item)
    }
}

fn default_role() -> String {
    "assistant".to_string()
}

/// An assistant `message` output item.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl MessageItem {
    /// Text of every content block that carries text, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|block| block.text.as_deref())
    }
}

/// One content block of a message (`output_text`, `refusal`, …).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
}

impl ContentBlock {
    /// An `output_text` block with no annotations.
    pub fn output_text(text: impl Into<String>) -> Self {
        ContentBlock {
            kind: "output_text".to_string(),
            text: Some(text.into()),
            annotations: Some(Vec::new()),
            refusal: None,
        }
    }
}

/// A `function_call` output item: the model asking for a tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCallItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Correlates the call with its `function_call_output`.
    pub call_id: String,
    pub name: String,
    /// JSON-encoded arguments string.
    pub arguments: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl FunctionCallItem {
    pub fn new(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        FunctionCallItem {
            id: None,
            call_id: call_id.into(),
            name: name.into(),
            arguments: arguments.into(),
            status: None,
        }
    }
}

// ─────────────────────────────────────────────
// Tool specs
// ─────────────────────────────────────────────

/// JSON-schema primitive types a tool parameter (or array element) can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Integer,
    Boolean,
    Object,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Object => "object",
        }
    }
}

/// Declared type of a tool parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterType {
    Primitive(PrimitiveType),
    /// Array whose elements are all of one primitive type.
    Array(PrimitiveType),
}

impl From<PrimitiveType> for ParameterType {
    fn from(primitive: PrimitiveType) -> Self {
        ParameterType::Primitive(primitive)
    }
}

impl ParameterType {
    /// Schema `type` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::Primitive(p) => p.as_str(),
            ParameterType::Array(_) => "array",
        }
    }

    /// Element type for arrays.
    pub fn items(&self) -> Option<PrimitiveType> {
        match self {
            ParameterType::Primitive(_) => None,
            ParameterType::Array(items) => Some(*items),
        }
    }
}

/// One declared parameter of a tool.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolParameter {
    pub name: String,
    pub param_type: ParameterType,
    pub description: String,
    pub required: bool,
}

/// Declarative description of a tool, as advertised to the remote model.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSpec {
    /// Unique within one registry snapshot.
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolSpec {
    /// JSON schema for the parameters object.
    ///
    /// Undeclared fields are rejected via `additionalProperties: false`.
    pub fn schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut property = Map::new();
            property.insert("type".into(), json!(param.param_type.as_str()));
            if let Some(items) = param.param_type.items() {
                property.insert("items".into(), json!({ "type": items.as_str() }));
            }
            property.insert("description".into(), json!(param.description));
            properties.insert(param.name.clone(), Value::Object(property));
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// The `tools[]` entry sent with a Responses API request.
    pub fn to_definition(&self) -> Value {
        json!({
            "type": "function",
            "name": self.name,
            "description": self.description,
            "strict": false,
            "parameters": self.schema(),
        })
    }
}

// ─────────────────────────────────────────────
// Tool results
// ─────────────────────────────────────────────

/// What a tool handler returns; serialized into the `function_call_output`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ToolResponse {
    /// Successful result carrying `content`.
    pub fn ok(content: impl Into<Value>) -> Self {
        ToolResponse {
            success: true,
            content: Some(content.into()),
            message: None,
        }
    }

    /// Failed result with a human-readable message.
    pub fn failure(message: impl Into<String>) -> Self {
        ToolResponse {
            success: false,
            content: None,
            message: Some(message.into()),
        }
    }

    /// The fixed result for a tool name missing from the registry.
    pub fn not_found() -> Self {
        ToolResponse {
            success: false,
            content: Some(Value::String("function_id not found".to_string())),
            message: None,
        }
    }

    /// Serialize to the JSON string placed in the transcript.
    pub fn to_output(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"success":false}"#.to_string())
    }
}

// ─────────────────────────────────────────────
// Schedule intervals (raw form)
// ─────────────────────────────────────────────

/// Interval tag as written in config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    /// Every wall-clock minute change. Options: a number (unused).
    Minute,
    /// Every hour at a minute. Options: `{minutes}`.
    Hourly,
    /// Once a day at a time. Options: `{hours, minutes}`.
    Daily,
    /// Every N hours. Options: `{hours}`.
    Hours,
}

impl IntervalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalType::Minute => "minute",
            IntervalType::Hourly => "hourly",
            IntervalType::Daily => "daily",
            IntervalType::Hours => "hours",
        }
    }
}

impl std::fmt::Display for IntervalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unvalidated schedule interval, as stored in config.
///
/// The `options` payload is free-form JSON so a malformed entry can be
/// loaded and then rejected, naming the entry, when the scheduler starts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterval {
    pub interval_type: IntervalType,
    pub options: Value,
}

impl ScheduleInterval {
    pub fn hourly(minutes: u32) -> Self {
        Self {
            interval_type: IntervalType::Hourly,
            options: json!({ "minutes": minutes }),
        }
    }

    pub fn daily(hours: u32, minutes: u32) -> Self {
        Self {
            interval_type: IntervalType::Daily,
            options: json!({ "hours": hours, "minutes": minutes }),
        }
    }

    pub fn hours(hours: u32) -> Self {
        Self {
            interval_type: IntervalType::Hours,
            options: json!({ "hours": hours }),
        }
    }

    pub fn minute() -> Self {
        Self {
            interval_type: IntervalType::Minute,
            options: json!(1),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
