#[cfg(test)]
#[path = "conversation_test.rs"]
mod conversation_test;

use serde::{Deserialize, Serialize};

/// Title given to conversations started without one.
pub const DEFAULT_TITLE: &str = "New conversation";

/// Max chars taken from the first user message when deriving a title.
pub const TITLE_MAX_CHARS: usize = 48;

/// Identifier of a conversation (UUID v4 string).
pub type ConversationId = String;

/// Identifier of a message (UUID v4 string).
pub type MessageId = String;

/// Author of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Lifecycle of a message as the chat API streams it in.
///
/// Status only moves forward: `Pending -> Streaming -> {Complete, Errored}`.
/// Skipping `Streaming` is allowed, going back or leaving a terminal state is not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Streaming,
    Complete,
    Errored,
}

impl MessageStatus {
    const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Streaming => 1,
            Self::Complete | Self::Errored => 2,
        }
    }

    /// `true` for `Complete` and `Errored`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Errored)
    }

    /// `true` while content may still be appended.
    pub const fn is_open(self) -> bool {
        !self.is_terminal()
    }

    /// Whether moving from `self` to `next` respects forward-only ordering.
    ///
    /// `Streaming -> Streaming` is allowed so every appended chunk is a valid step.
    pub const fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (Self::Streaming, Self::Streaming) => true,
            _ => next.rank() > self.rank(),
        }
    }
}

/// User rating attached to an assistant reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Positive,
    Negative,
}

/// One turn in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub status: MessageStatus,
    /// Set when the stream for this message failed.
    pub error: Option<String>,
    pub feedback: Option<Feedback>,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl Message {
    /// A finished message authored locally (user or system turn).
    pub fn authored(id: MessageId, role: MessageRole, content: String, created_at: u64) -> Self {
        Self { id, role, content, status: MessageStatus::Complete, error: None, feedback: None, created_at }
    }

    /// An assistant reply waiting for its first chunk.
    pub fn pending_reply(id: MessageId, created_at: u64) -> Self {
        Self {
            id,
            role: MessageRole::Assistant,
            content: String::new(),
            status: MessageStatus::Pending,
            error: None,
            feedback: None,
            created_at,
        }
    }
}

/// An ordered, identified sequence of messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub created_at: u64,
    pub updated_at: u64,
    /// Chronological; insertion order is meaningful.
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(id: ConversationId, title: Option<String>, now: u64) -> Self {
        let title = title
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_owned());
        Self { id, title, created_at: now, updated_at: now, messages: Vec::new() }
    }

    /// The last message if it still accepts chunks.
    pub fn open_message(&self) -> Option<&Message> {
        self.messages.last().filter(|m| m.status.is_open())
    }

    /// `true` while an assistant reply is pending or streaming.
    pub fn is_streaming(&self) -> bool {
        self.open_message().is_some()
    }

    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }
}

/// Build a short conversation title from the first user message.
///
/// Whitespace runs collapse to single spaces; long text is cut on a char
/// boundary and ends with an ellipsis.
pub fn derive_title(content: &str) -> Option<String> {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    if collapsed.chars().count() <= TITLE_MAX_CHARS {
        return Some(collapsed);
    }
    let mut title: String = collapsed.chars().take(TITLE_MAX_CHARS).collect();
    title.truncate(title.trim_end().len());
    title.push('…');
    Some(title)
}
