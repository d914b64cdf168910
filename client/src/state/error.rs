//! Errors returned by the conversation store.
//!
//! Only `AlreadyInitialized` and `NotInitialized` indicate a programming
//! error; every other variant is a rejected dispatch that left the store
//! untouched and is reported back to the view that dispatched it.

use super::conversation::{ConversationId, MessageId, MessageStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// `initialize` was called on a store that already owns a session.
    #[error("conversation store already initialized")]
    AlreadyInitialized,

    /// The store was used before `initialize`.
    #[error("conversation store not initialized")]
    NotInitialized,

    #[error("unknown conversation: {0}")]
    UnknownConversation(ConversationId),

    #[error("unknown message {message_id} in conversation {conversation_id}")]
    UnknownMessage { conversation_id: ConversationId, message_id: MessageId },

    /// Complete/fail was dispatched but no reply is pending or streaming.
    #[error("conversation {0} has no open message")]
    NoOpenMessage(ConversationId),

    /// A chunk arrived for a reply that already reached a terminal status.
    #[error("last message in conversation {0} is closed")]
    MessageClosed(ConversationId),

    /// The conversation is still receiving a reply.
    #[error("conversation {0} is still streaming a reply")]
    StreamInFlight(ConversationId),

    #[error("message content is empty")]
    EmptyMessage,

    #[error("conversation title is empty")]
    EmptyTitle,

    #[error("invalid status transition {from:?} -> {to:?}")]
    InvalidTransition { from: MessageStatus, to: MessageStatus },

    /// Feedback only applies to completed assistant replies.
    #[error("feedback not allowed on message {0}")]
    FeedbackNotAllowed(MessageId),
}

impl StoreError {
    /// `true` for errors that mean the store was misused rather than a
    /// single action being rejected.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::AlreadyInitialized | Self::NotInitialized)
    }
}
