//! Session snapshot and the reducer that applies actions to it.
//!
//! DESIGN
//! ======
//! `SessionState::apply` is the only code that mutates conversation data.
//! Each arm looks up and validates everything it needs before touching the
//! state, so a rejected action leaves the snapshot exactly as it was.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde::{Deserialize, Serialize};

use super::conversation::{
    Conversation, ConversationId, Feedback, Message, MessageId, MessageRole, MessageStatus, derive_title,
};
use super::error::StoreError;

// =============================================================================
// SESSION
// =============================================================================

/// One browser tab's lifetime of application state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub started_at: u64,
}

/// Immutable snapshot handed to views for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub session: Session,
    /// Insertion order.
    pub conversations: Vec<Conversation>,
    pub active: Option<ConversationId>,
}

// =============================================================================
// ACTIONS
// =============================================================================

/// A single state transition. Conversation-scoped variants carry the target
/// conversation in `id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    StartConversation { title: Option<String> },
    SelectConversation { id: ConversationId },
    RenameConversation { id: ConversationId, title: String },
    DeleteConversation { id: ConversationId },
    ClearMessages { id: ConversationId },
    AppendUserMessage { id: ConversationId, content: String },
    AddSystemMessage { id: ConversationId, content: String },
    BeginAssistantMessage { id: ConversationId },
    AppendChunk { id: ConversationId, chunk: String },
    CompleteMessage { id: ConversationId },
    FailMessage { id: ConversationId, error: String },
    SetFeedback { id: ConversationId, message_id: MessageId, feedback: Option<Feedback> },
}

impl Action {
    /// Short name used in log lines.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StartConversation { .. } => "start_conversation",
            Self::SelectConversation { .. } => "select_conversation",
            Self::RenameConversation { .. } => "rename_conversation",
            Self::DeleteConversation { .. } => "delete_conversation",
            Self::ClearMessages { .. } => "clear_messages",
            Self::AppendUserMessage { .. } => "append_user_message",
            Self::AddSystemMessage { .. } => "add_system_message",
            Self::BeginAssistantMessage { .. } => "begin_assistant_message",
            Self::AppendChunk { .. } => "append_chunk",
            Self::CompleteMessage { .. } => "complete_message",
            Self::FailMessage { .. } => "fail_message",
            Self::SetFeedback { .. } => "set_feedback",
        }
    }
}

/// What a committed action produced, for callers that need the new ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Started(ConversationId),
    MessageCreated(MessageId),
    MessageUpdated(MessageId),
    Updated,
}

/// Source of ids and timestamps for the reducer. Swapped out in tests for a
/// deterministic sequence.
pub trait Environment: Send {
    fn new_id(&mut self) -> String;
    fn now_ms(&self) -> u64;
}

/// UUID v4 ids and wall-clock time.
#[derive(Debug, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn new_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn now_ms(&self) -> u64 {
        crate::util::clock::now_ms()
    }
}

// =============================================================================
// REDUCER
// =============================================================================

impl SessionState {
    /// Fresh session with no conversations and nothing active.
    pub fn new(session: Session) -> Self {
        Self { session, conversations: Vec::new(), active: None }
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active.as_deref().and_then(|id| self.conversation(id))
    }

    /// Conversations ordered most recently updated first; ties keep insertion order.
    pub fn conversations_by_recent(&self) -> Vec<&Conversation> {
        let mut list: Vec<&Conversation> = self.conversations.iter().collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        list
    }

    /// `true` when the active reference is unset or points at a listed conversation.
    pub fn active_reference_valid(&self) -> bool {
        self.active.as_deref().is_none_or(|id| self.conversation(id).is_some())
    }

    fn index_of(&self, id: &str) -> Result<usize, StoreError> {
        self.conversations
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::UnknownConversation(id.to_owned()))
    }

    /// Apply one action. On `Err` nothing has changed.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] describing why the action was rejected.
    pub fn apply(&mut self, action: Action, env: &mut dyn Environment) -> Result<DispatchOutcome, StoreError> {
        match action {
            Action::StartConversation { title } => {
                let id = env.new_id();
                self.conversations.push(Conversation::new(id.clone(), title, env.now_ms()));
                self.active = Some(id.clone());
                Ok(DispatchOutcome::Started(id))
            }
            Action::SelectConversation { id } => {
                self.index_of(&id)?;
                self.active = Some(id);
                Ok(DispatchOutcome::Updated)
            }
            Action::RenameConversation { id, title } => {
                let idx = self.index_of(&id)?;
                let title = title.trim();
                if title.is_empty() {
                    return Err(StoreError::EmptyTitle);
                }
                let conversation = &mut self.conversations[idx];
                conversation.title = title.to_owned();
                conversation.updated_at = env.now_ms();
                Ok(DispatchOutcome::Updated)
            }
            Action::DeleteConversation { id } => {
                let idx = self.index_of(&id)?;
                self.conversations.remove(idx);
                if self.active.as_deref() == Some(id.as_str()) {
                    self.active = None;
                }
                Ok(DispatchOutcome::Updated)
            }
            Action::ClearMessages { id } => {
                let idx = self.index_of(&id)?;
                if self.conversations[idx].is_streaming() {
                    return Err(StoreError::StreamInFlight(id));
                }
                let conversation = &mut self.conversations[idx];
                conversation.messages.clear();
                conversation.updated_at = env.now_ms();
                Ok(DispatchOutcome::Updated)
            }
            Action::AppendUserMessage { id, content } => self.push_authored(id, MessageRole::User, content, env),
            Action::AddSystemMessage { id, content } => self.push_authored(id, MessageRole::System, content, env),
            Action::BeginAssistantMessage { id } => {
                let idx = self.index_of(&id)?;
                if self.conversations[idx].is_streaming() {
                    return Err(StoreError::StreamInFlight(id));
                }
                let message_id = env.new_id();
                let now = env.now_ms();
                let conversation = &mut self.conversations[idx];
                conversation.messages.push(Message::pending_reply(message_id.clone(), now));
                conversation.updated_at = now;
                Ok(DispatchOutcome::MessageCreated(message_id))
            }
            Action::AppendChunk { id, chunk } => self.append_chunk(id, chunk, env),
            Action::CompleteMessage { id } => self.close_open_message(id, MessageStatus::Complete, None, env),
            Action::FailMessage { id, error } => self.close_open_message(id, MessageStatus::Errored, Some(error), env),
            Action::SetFeedback { id, message_id, feedback } => {
                let idx = self.index_of(&id)?;
                let Some(pos) = self.conversations[idx].messages.iter().position(|m| m.id == message_id) else {
                    return Err(StoreError::UnknownMessage { conversation_id: id, message_id });
                };
                let message = &mut self.conversations[idx].messages[pos];
                if message.role != MessageRole::Assistant || message.status != MessageStatus::Complete {
                    return Err(StoreError::FeedbackNotAllowed(message_id));
                }
                message.feedback = feedback;
                Ok(DispatchOutcome::MessageUpdated(message_id))
            }
        }
    }

    fn push_authored(
        &mut self,
        id: ConversationId,
        role: MessageRole,
        content: String,
        env: &mut dyn Environment,
    ) -> Result<DispatchOutcome, StoreError> {
        let idx = self.index_of(&id)?;
        if content.trim().is_empty() {
            return Err(StoreError::EmptyMessage);
        }
        if self.conversations[idx].is_streaming() {
            return Err(StoreError::StreamInFlight(id));
        }
        let message_id = env.new_id();
        let now = env.now_ms();
        let conversation = &mut self.conversations[idx];
        if role == MessageRole::User && conversation.has_default_title() {
            if let Some(title) = derive_title(&content) {
                conversation.title = title;
            }
        }
        conversation.messages.push(Message::authored(message_id.clone(), role, content, now));
        conversation.updated_at = now;
        Ok(DispatchOutcome::MessageCreated(message_id))
    }

    fn append_chunk(
        &mut self,
        id: ConversationId,
        chunk: String,
        env: &mut dyn Environment,
    ) -> Result<DispatchOutcome, StoreError> {
        let idx = self.index_of(&id)?;
        let now = env.now_ms();
        let last = self.conversations[idx].messages.last().map(|m| (m.role, m.status));

        match last {
            Some((_, status)) if status.is_open() => {
                let conversation = &mut self.conversations[idx];
                let Some(message) = conversation.messages.last_mut() else {
                    return Err(StoreError::NoOpenMessage(id));
                };
                message.content.push_str(&chunk);
                message.status = MessageStatus::Streaming;
                let message_id = message.id.clone();
                conversation.updated_at = now;
                Ok(DispatchOutcome::MessageUpdated(message_id))
            }
            Some((MessageRole::Assistant, _)) => Err(StoreError::MessageClosed(id)),
            _ => {
                let message_id = env.new_id();
                let mut message = Message::pending_reply(message_id.clone(), now);
                message.content = chunk;
                message.status = MessageStatus::Streaming;
                let conversation = &mut self.conversations[idx];
                conversation.messages.push(message);
                conversation.updated_at = now;
                Ok(DispatchOutcome::MessageCreated(message_id))
            }
        }
    }

    fn close_open_message(
        &mut self,
        id: ConversationId,
        to: MessageStatus,
        error: Option<String>,
        env: &mut dyn Environment,
    ) -> Result<DispatchOutcome, StoreError> {
        let idx = self.index_of(&id)?;
        let Some(from) = self.conversations[idx].open_message().map(|m| m.status) else {
            return Err(StoreError::NoOpenMessage(id));
        };
        if !from.can_transition_to(to) {
            return Err(StoreError::InvalidTransition { from, to });
        }
        let now = env.now_ms();
        let conversation = &mut self.conversations[idx];
        let Some(message) = conversation.messages.last_mut() else {
            return Err(StoreError::NoOpenMessage(id));
        };
        message.status = to;
        message.error = error;
        let message_id = message.id.clone();
        conversation.updated_at = now;
        Ok(DispatchOutcome::MessageUpdated(message_id))
    }
}
