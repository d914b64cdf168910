//! The conversation store: the single writable source of truth shared by
//! every routed view.
//!
//! SYSTEM CONTEXT
//! ==============
//! Bootstrap constructs one store, initializes it, and hands it to `App`,
//! which provides it through Leptos context. Views read snapshots and write
//! only through `dispatch`. Subscribers are called after every committed
//! action with the new snapshot; rejected actions notify nobody.
//!
//! The inner `Mutex` exists because Leptos context requires `Send + Sync`.
//! The client is single-threaded, so the lock is never contended. It is
//! released before subscribers run, so a subscriber may dispatch again. A
//! dispatch made during notification queues its snapshot; the outermost
//! dispatch delivers queued snapshots in commit order, so every subscriber
//! sees every snapshot and ends on the latest one.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::error::StoreError;
use super::session::{Action, DispatchOutcome, Environment, Session, SessionState, SystemEnvironment};

type Subscriber = Arc<dyn Fn(&SessionState) + Send + Sync>;

/// Handle returned by [`ConversationStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner {
    state: Option<SessionState>,
    env: Box<dyn Environment>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    /// Committed snapshots not yet delivered.
    pending: VecDeque<SessionState>,
    notifying: bool,
}

/// Cloneable handle to the shared store. Clones see the same state.
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<Mutex<Inner>>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ConversationStore")
            .field("initialized", &inner.state.is_some())
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl ConversationStore {
    /// Uninitialized store using UUID ids and the wall clock.
    pub fn new() -> Self {
        Self::with_environment(SystemEnvironment)
    }

    pub fn with_environment(env: impl Environment + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: None,
                env: Box::new(env),
                subscribers: Vec::new(),
                next_subscription: 0,
                pending: VecDeque::new(),
                notifying: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Establish the session with no conversations. Must be called exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyInitialized`] on a second call.
    pub fn initialize(&self) -> Result<Session, StoreError> {
        let mut inner = self.lock();
        if inner.state.is_some() {
            log::error!("conversation store initialized twice");
            return Err(StoreError::AlreadyInitialized);
        }
        let session = Session { id: inner.env.new_id(), started_at: inner.env.now_ms() };
        log::info!("session {} started", session.id);
        inner.state = Some(SessionState::new(session.clone()));
        Ok(session)
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().state.is_some()
    }

    /// Current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] before `initialize`.
    pub fn get_state(&self) -> Result<SessionState, StoreError> {
        self.lock().state.clone().ok_or(StoreError::NotInitialized)
    }

    /// Apply one action and notify subscribers if it was committed.
    ///
    /// # Errors
    ///
    /// Returns the reducer's rejection; the state is unchanged in that case.
    pub fn dispatch(&self, action: Action) -> Result<DispatchOutcome, StoreError> {
        let name = action.name();
        let outcome = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            let Some(state) = inner.state.as_mut() else {
                return Err(StoreError::NotInitialized);
            };
            match state.apply(action, inner.env.as_mut()) {
                Ok(outcome) => {
                    let snapshot = state.clone();
                    inner.pending.push_back(snapshot);
                    outcome
                }
                Err(e) => {
                    log::warn!("dispatch {name} rejected: {e}");
                    return Err(e);
                }
            }
        };

        log::debug!("dispatch {name} committed: {outcome:?}");
        self.notify();
        Ok(outcome)
    }

    /// Deliver queued snapshots in order. Only the outermost caller drains;
    /// nested calls from inside a subscriber return at once.
    fn notify(&self) {
        {
            let mut inner = self.lock();
            if inner.notifying {
                return;
            }
            inner.notifying = true;
        }
        let _reset = NotifyingReset(self);

        loop {
            let (snapshot, subscribers) = {
                let mut inner = self.lock();
                let Some(snapshot) = inner.pending.pop_front() else {
                    break;
                };
                let subscribers: Vec<Subscriber> = inner.subscribers.iter().map(|(_, s)| Arc::clone(s)).collect();
                (snapshot, subscribers)
            };
            for subscriber in subscribers {
                subscriber(&snapshot);
            }
        }
    }

    /// Register `f` to run after every committed action.
    pub fn subscribe(&self, f: impl Fn(&SessionState) + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.subscribers.push((id, Arc::new(f)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() != before
    }
}

/// Clears the notifying flag even if a subscriber panics.
struct NotifyingReset<'a>(&'a ConversationStore);

impl Drop for NotifyingReset<'_> {
    fn drop(&mut self) {
        let mut inner = self.0.lock();
        inner.notifying = false;
        inner.pending.clear();
    }
}
