use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::state::conversation::MessageStatus;
use crate::state::test_support::SeqEnv;

fn ready_store() -> ConversationStore {
    let store = ConversationStore::with_environment(SeqEnv::default());
    store.initialize().unwrap();
    store
}

fn start(store: &ConversationStore) -> String {
    match store.dispatch(Action::StartConversation { title: None }).unwrap() {
        DispatchOutcome::Started(id) => id,
        other => panic!("unexpected outcome {other:?}"),
    }
}

// =============================================================
// Initialization
// =============================================================

#[test]
fn initialize_creates_empty_session() {
    let store = ConversationStore::with_environment(SeqEnv::default());
    assert!(!store.is_initialized());

    let session = store.initialize().unwrap();
    let state = store.get_state().unwrap();
    assert_eq!(state.session, session);
    assert!(state.conversations.is_empty());
    assert!(state.active.is_none());
}

#[test]
fn initialize_twice_is_rejected() {
    let store = ready_store();
    let before = store.get_state().unwrap();

    let err = store.initialize().unwrap_err();
    assert_eq!(err, StoreError::AlreadyInitialized);
    assert!(err.is_fatal());
    assert_eq!(store.get_state().unwrap(), before);
}

#[test]
fn use_before_initialize_is_rejected() {
    let store = ConversationStore::with_environment(SeqEnv::default());
    assert_eq!(store.get_state().unwrap_err(), StoreError::NotInitialized);
    assert_eq!(
        store.dispatch(Action::StartConversation { title: None }).unwrap_err(),
        StoreError::NotInitialized
    );
}

#[test]
fn clones_share_state() {
    let store = ready_store();
    let other = store.clone();
    let id = start(&store);

    assert_eq!(other.get_state().unwrap().active, Some(id));
}

// =============================================================
// Dispatch scenario
// =============================================================

#[test]
fn streaming_scenario_end_to_end() {
    let store = ready_store();
    let id = start(&store);

    let state = store.get_state().unwrap();
    assert_eq!(state.conversations.len(), 1);
    assert_eq!(state.active.as_deref(), Some(id.as_str()));
    assert!(state.conversations[0].messages.is_empty());

    for _ in 0..2 {
        store.dispatch(Action::AppendChunk { id: id.clone(), chunk: "Hello".into() }).unwrap();
    }
    let state = store.get_state().unwrap();
    let messages = &state.conversation(&id).unwrap().messages;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].status, MessageStatus::Streaming);
    assert_eq!(messages[0].content, "HelloHello");

    store.dispatch(Action::CompleteMessage { id: id.clone() }).unwrap();
    assert_eq!(store.get_state().unwrap().conversation(&id).unwrap().messages[0].status, MessageStatus::Complete);

    let before = store.get_state().unwrap();
    assert!(store.dispatch(Action::AppendChunk { id: id.clone(), chunk: "late".into() }).is_err());
    assert_eq!(store.get_state().unwrap(), before);
}

#[test]
fn unknown_conversation_leaves_state_unchanged() {
    let store = ready_store();
    start(&store);
    let before = store.get_state().unwrap();

    let err = store.dispatch(Action::SelectConversation { id: "ghost".into() }).unwrap_err();
    assert_eq!(err, StoreError::UnknownConversation("ghost".into()));
    assert!(!err.is_fatal());
    assert_eq!(store.get_state().unwrap(), before);
}

// =============================================================
// Subscriptions
// =============================================================

#[test]
fn subscribers_notified_on_commit_only() {
    let store = ready_store();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    store.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let id = start(&store);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let _ = store.dispatch(Action::CompleteMessage { id });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn subscriber_receives_committed_snapshot() {
    let store = ready_store();
    let last = Arc::new(Mutex::new(None::<SessionState>));
    let sink = Arc::clone(&last);
    store.subscribe(move |state| {
        *sink.lock().unwrap() = Some(state.clone());
    });

    start(&store);
    let notified = last.lock().unwrap().clone().unwrap();
    assert_eq!(notified, store.get_state().unwrap());
}

#[test]
fn unsubscribe_stops_notifications() {
    let store = ready_store();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let sub = store.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    assert!(store.unsubscribe(sub));
    assert!(!store.unsubscribe(sub));
    start(&store);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn subscriber_may_dispatch_without_deadlock() {
    let store = ready_store();
    let inner = store.clone();
    let fired = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&fired);
    store.subscribe(move |state| {
        if state.conversations.len() == 1 && flag.fetch_add(1, Ordering::SeqCst) == 0 {
            let _ = inner.dispatch(Action::StartConversation { title: Some("nested".into()) });
        }
    });

    start(&store);
    assert_eq!(store.get_state().unwrap().conversations.len(), 2);
}

#[test]
fn nested_dispatch_reaches_later_subscribers_in_order() {
    let store = ready_store();
    let inner = store.clone();
    let fired = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&fired);
    store.subscribe(move |_| {
        if flag.fetch_add(1, Ordering::SeqCst) == 0 {
            let _ = inner.dispatch(Action::StartConversation { title: Some("nested".into()) });
        }
    });
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    store.subscribe(move |state| record.lock().unwrap().push(state.conversations.len()));

    start(&store);

    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    assert_eq!(store.get_state().unwrap().conversations.len(), 2);
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

// =============================================================
// Properties
// =============================================================

mod properties {
    use proptest::prelude::*;

    use super::*;

    #[derive(Clone, Debug)]
    enum Op {
        Start,
        Select(usize),
        Delete(usize),
        UserMessage(usize),
        Begin(usize),
        Chunk(usize),
        Complete(usize),
        Fail(usize),
        Ghost,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Start),
            (0usize..4).prop_map(Op::Select),
            (0usize..4).prop_map(Op::Delete),
            (0usize..4).prop_map(Op::UserMessage),
            (0usize..4).prop_map(Op::Begin),
            (0usize..4).prop_map(Op::Chunk),
            (0usize..4).prop_map(Op::Complete),
            (0usize..4).prop_map(Op::Fail),
            Just(Op::Ghost),
        ]
    }

    fn to_action(op: &Op, state: &SessionState) -> Action {
        let pick = |i: usize| {
            if state.conversations.is_empty() {
                "ghost".to_owned()
            } else {
                state.conversations[i % state.conversations.len()].id.clone()
            }
        };
        match op {
            Op::Start => Action::StartConversation { title: None },
            Op::Select(i) => Action::SelectConversation { id: pick(*i) },
            Op::Delete(i) => Action::DeleteConversation { id: pick(*i) },
            Op::UserMessage(i) => Action::AppendUserMessage { id: pick(*i), content: "hi".into() },
            Op::Begin(i) => Action::BeginAssistantMessage { id: pick(*i) },
            Op::Chunk(i) => Action::AppendChunk { id: pick(*i), chunk: "x".into() },
            Op::Complete(i) => Action::CompleteMessage { id: pick(*i) },
            Op::Fail(i) => Action::FailMessage { id: pick(*i), error: "e".into() },
            Op::Ghost => Action::AppendChunk { id: "ghost".into(), chunk: "x".into() },
        }
    }

    fn rank(status: MessageStatus) -> u8 {
        match status {
            MessageStatus::Pending => 0,
            MessageStatus::Streaming => 1,
            MessageStatus::Complete | MessageStatus::Errored => 2,
        }
    }

    proptest! {
        #[test]
        fn active_reference_always_valid(ops in prop::collection::vec(op(), 0..60)) {
            let store = ready_store();
            for op in &ops {
                let action = to_action(op, &store.get_state().unwrap());
                let _ = store.dispatch(action);
                prop_assert!(store.get_state().unwrap().active_reference_valid());
            }
        }

        #[test]
        fn rejected_dispatch_never_changes_state(ops in prop::collection::vec(op(), 0..60)) {
            let store = ready_store();
            for op in &ops {
                let before = store.get_state().unwrap();
                let action = to_action(op, &before);
                if store.dispatch(action).is_err() {
                    prop_assert_eq!(store.get_state().unwrap(), before);
                }
            }
        }

        #[test]
        fn message_status_only_moves_forward(ops in prop::collection::vec(op(), 0..60)) {
            let store = ready_store();
            let mut seen: std::collections::HashMap<String, MessageStatus> = std::collections::HashMap::new();
            for op in &ops {
                let action = to_action(op, &store.get_state().unwrap());
                let _ = store.dispatch(action);
                for conversation in &store.get_state().unwrap().conversations {
                    for message in &conversation.messages {
                        if let Some(prev) = seen.get(&message.id) {
                            prop_assert!(
                                *prev == message.status || prev.can_transition_to(message.status),
                                "{:?} -> {:?}", prev, message.status
                            );
                            prop_assert!(rank(message.status) >= rank(*prev));
                        }
                        seen.insert(message.id.clone(), message.status);
                    }
                }
            }
        }

        #[test]
        fn chunks_append_in_order(chunks in prop::collection::vec("[a-z]{0,5}", 1..20)) {
            let store = ready_store();
            let id = start(&store);
            for c in &chunks {
                store.dispatch(Action::AppendChunk { id: id.clone(), chunk: c.clone() }).unwrap();
            }
            let state = store.get_state().unwrap();
            let message = &state.conversation(&id).unwrap().messages[0];
            prop_assert_eq!(&message.content, &chunks.concat());
            prop_assert_eq!(state.conversation(&id).unwrap().messages.len(), 1);
        }
    }
}
