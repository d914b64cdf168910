//! Client-held conversation state.
//!
//! DESIGN
//! ======
//! `conversation` holds the plain data types, `session` the snapshot and the
//! reducer, `store` the shared handle views dispatch into. Nothing outside
//! `session::SessionState::apply` mutates conversation data.

pub mod conversation;
pub mod error;
pub mod session;
pub mod store;

pub use conversation::{Conversation, ConversationId, Feedback, Message, MessageId, MessageRole, MessageStatus};
pub use error::StoreError;
pub use session::{Action, DispatchOutcome, Environment, Session, SessionState, SystemEnvironment};
pub use store::{ConversationStore, SubscriptionId};

#[cfg(test)]
pub(crate) mod test_support;
