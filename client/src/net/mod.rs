//! Chat API client: wire types, NDJSON framing, the streaming transport and
//! the glue that turns stream events into store dispatches.

pub mod chat_api;
pub mod ndjson;
pub mod reply;
pub mod types;

/// Same-origin endpoint served by the launcher.
pub const CHAT_ENDPOINT: &str = "/conversation";

/// Failures talking to the chat API. Each one ends the affected reply as
/// `errored`; none of them reach beyond that message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatApiError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("chat API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response stream failed: {0}")]
    Stream(String),

    #[error("malformed response line: {0}")]
    Parse(String),

    /// The backend reported an error inside the stream.
    #[error("{0}")]
    Backend(String),

    #[error("chat API unavailable outside the browser")]
    Unavailable,
}
