//! Feeds a streamed reply into the conversation store.
//!
//! Chunks are dispatched in arrival order. When the conversation disappears
//! mid-stream (deleted by the user) the reply is abandoned quietly; the store
//! has nothing to cancel.

#[cfg(test)]
#[path = "reply_test.rs"]
mod reply_test;

use super::ChatApiError;
use super::types::StreamEvent;
use crate::state::{Action, ConversationId, ConversationStore, StoreError};

/// Whether the transport should keep reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamControl {
    Continue,
    Stop,
}

/// Dispatch one stream event for `id`.
pub fn apply_event(store: &ConversationStore, id: &ConversationId, event: StreamEvent) -> StreamControl {
    let action = match event {
        StreamEvent::Delta(chunk) => Action::AppendChunk { id: id.clone(), chunk },
        StreamEvent::Error(error) => Action::FailMessage { id: id.clone(), error },
    };
    let terminal = matches!(action, Action::FailMessage { .. });
    match store.dispatch(action) {
        Ok(_) if !terminal => StreamControl::Continue,
        Ok(_) => StreamControl::Stop,
        Err(StoreError::UnknownConversation(_)) => {
            log::debug!("conversation {id} gone; dropping rest of reply");
            StreamControl::Stop
        }
        Err(e) => {
            log::warn!("reply for {id} stopped: {e}");
            StreamControl::Stop
        }
    }
}

/// Close the open reply once the transport is done: `complete` on a clean
/// end of stream, `errored` on a transport failure. A reply that was already
/// closed by an in-stream error is left as is.
pub fn finish(store: &ConversationStore, id: &ConversationId, result: Result<(), ChatApiError>) {
    let action = match result {
        Ok(()) => Action::CompleteMessage { id: id.clone() },
        Err(e) => Action::FailMessage { id: id.clone(), error: e.to_string() },
    };
    match store.dispatch(action) {
        Ok(_) | Err(StoreError::NoOpenMessage(_) | StoreError::UnknownConversation(_)) => {}
        Err(e) => log::warn!("could not close reply for {id}: {e}"),
    }
}
