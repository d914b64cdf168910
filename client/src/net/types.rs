//! Wire types for the `/conversation` chat API.
//!
//! Requests carry the conversation history; responses are NDJSON where each
//! line is a completion chunk, an empty keep-alive object, or an error.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

use super::ChatApiError;
use crate::state::{Conversation, MessageRole, MessageStatus};

/// One history entry sent upstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Body of `POST /conversation`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
}

impl ChatRequest {
    /// History of finished, non-empty turns in chronological order. Errored
    /// and still-open replies are left out.
    pub fn from_conversation(conversation: &Conversation) -> Self {
        let messages = conversation
            .messages
            .iter()
            .filter(|m| m.status == MessageStatus::Complete && !m.content.trim().is_empty())
            .map(|m| WireMessage { role: m.role, content: m.content.clone() })
            .collect();
        Self { messages }
    }
}

#[derive(Debug, Default, Deserialize)]
struct StreamLine {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    messages: Vec<StreamMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: Option<String>,
}

/// Meaningful content of one response line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    /// Assistant text to append.
    Delta(String),
    /// The backend gave up; the reply is errored.
    Error(String),
}

/// Interpret one NDJSON line. Returns `Ok(None)` for lines that carry nothing
/// for the transcript (keep-alives, tool output, citation context).
///
/// # Errors
///
/// Returns [`ChatApiError::Parse`] if the line is not a JSON object.
pub fn parse_stream_line(line: &str) -> Result<Option<StreamEvent>, ChatApiError> {
    let parsed: StreamLine = serde_json::from_str(line).map_err(|e| ChatApiError::Parse(e.to_string()))?;

    // `"error": null` deserializes to `None` and reads as a keep-alive.
    if let Some(error) = parsed.error {
        let message = match error {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        return Ok(Some(StreamEvent::Error(message)));
    }

    let text: String = parsed
        .choices
        .iter()
        .flat_map(|c| c.messages.iter())
        .filter(|m| m.role == "assistant")
        .filter_map(|m| m.content.as_deref())
        .collect();

    if text.is_empty() { Ok(None) } else { Ok(Some(StreamEvent::Delta(text))) }
}
