//! Chat page: transcript of the active conversation plus the composer.
//!
//! DESIGN
//! ======
//! Sending is split in two. `submit_turn` does the synchronous store work
//! (user message, pending reply) and returns the request to send;
//! `spawn_reply` runs the network side and feeds chunks back through
//! `net::reply`. Only the first half touches the composer's state.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use leptos::prelude::*;

use crate::components::message_view::MessageView;
use crate::net::types::ChatRequest;
use crate::state::{Action, ConversationId, ConversationStore, DispatchOutcome, SessionState, StoreError};
use crate::util::icons;

/// A turn that has been recorded locally and is waiting on the network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTurn {
    pub conversation_id: ConversationId,
    pub request: ChatRequest,
}

/// Record the user's message and open an assistant reply for it.
///
/// Starts a conversation first when none is active. The request is built
/// from the transcript as it stands after the user message, so the pending
/// reply is never sent upstream.
///
/// # Errors
///
/// Returns [`StoreError::EmptyMessage`] for blank input, or whatever the
/// store rejects (for example a reply already streaming).
pub fn submit_turn(store: &ConversationStore, content: &str) -> Result<PendingTurn, StoreError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(StoreError::EmptyMessage);
    }

    let state = store.get_state()?;
    let conversation_id = match state.active_conversation() {
        Some(c) => c.id.clone(),
        None => match store.dispatch(Action::StartConversation { title: None })? {
            DispatchOutcome::Started(id) => id,
            other => {
                log::error!("start_conversation produced {other:?}");
                return Err(StoreError::NotInitialized);
            }
        },
    };

    store.dispatch(Action::AppendUserMessage { id: conversation_id.clone(), content: content.to_owned() })?;

    let state = store.get_state()?;
    let conversation = state
        .conversation(&conversation_id)
        .ok_or_else(|| StoreError::UnknownConversation(conversation_id.clone()))?;
    let request = ChatRequest::from_conversation(conversation);

    store.dispatch(Action::BeginAssistantMessage { id: conversation_id.clone() })?;
    Ok(PendingTurn { conversation_id, request })
}

/// What to show the user when a send is rejected. Blank input is ignored
/// silently; a misused store means the page needs a reload.
pub fn send_failure_notice(error: &StoreError) -> Option<String> {
    if *error == StoreError::EmptyMessage {
        return None;
    }
    if error.is_fatal() {
        log::error!("message not sent, store unusable: {error}");
        return Some("Chat is unavailable. Reload the page to start a new session.".to_owned());
    }
    log::warn!("message not sent: {error}");
    Some(error.to_string())
}

/// Stream the reply for `turn` into the store. Completion or failure always
/// closes the open reply.
pub fn spawn_reply(store: ConversationStore, turn: PendingTurn) {
    #[cfg(feature = "csr")]
    leptos::task::spawn_local(async move {
        let PendingTurn { conversation_id, request } = turn;
        let result = crate::net::chat_api::stream_chat(&request, |event| {
            crate::net::reply::apply_event(&store, &conversation_id, event)
        })
        .await;
        crate::net::reply::finish(&store, &conversation_id, result);
    });

    #[cfg(not(feature = "csr"))]
    crate::net::reply::finish(&store, &turn.conversation_id, Err(crate::net::ChatApiError::Unavailable));
}

/// Chat screen for the active conversation.
#[component]
pub fn ChatPage() -> impl IntoView {
    let store = StoredValue::new(expect_context::<ConversationStore>());
    let state = expect_context::<ReadSignal<SessionState>>();
    let draft = RwSignal::new(String::new());
    let notice = RwSignal::new(None::<String>);

    let busy = Memo::new(move |_| state.with(|s| s.active_conversation().is_some_and(|c| c.is_streaming())));

    let send = move || {
        if busy.get_untracked() {
            return;
        }
        let content = draft.get_untracked();
        match store.with_value(|s| submit_turn(s, &content)) {
            Ok(turn) => {
                draft.set(String::new());
                notice.set(None);
                spawn_reply(store.get_value(), turn);
            }
            Err(e) => notice.set(send_failure_notice(&e)),
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        send();
    };

    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send();
        }
    };

    let on_clear = move |_| {
        let Some(id) = state.with_untracked(|s| s.active.clone()) else {
            return;
        };
        if let Err(e) = store.with_value(|s| s.dispatch(Action::ClearMessages { id })) {
            notice.set(Some(e.to_string()));
        }
    };

    view! {
        <section class="chat-page">
            <header class="chat-page__header">
                <h1 class="chat-page__title">
                    {move || {
                        state.with(|s| {
                            s.active_conversation().map_or_else(|| "Start a conversation".to_owned(), |c| c.title.clone())
                        })
                    }}
                </h1>
                <button
                    class="btn chat-page__clear"
                    disabled=move || busy.get() || state.with(|s| s.active_conversation().is_none_or(|c| c.messages.is_empty()))
                    on:click=on_clear
                >
                    "Clear"
                </button>
            </header>
            <div class="chat-page__transcript">
                {move || {
                    let snapshot = state.get();
                    match snapshot.active_conversation() {
                        None => view! {
                            <p class="chat-page__empty">"Ask anything to begin."</p>
                        }
                        .into_any(),
                        Some(conversation) => {
                            let id = conversation.id.clone();
                            conversation
                                .messages
                                .iter()
                                .map(|m| view! { <MessageView message=m.clone() conversation_id=id.clone()/> })
                                .collect::<Vec<_>>()
                                .into_any()
                        }
                    }
                }}
            </div>
            <Show when=move || notice.get().is_some()>
                <div class="chat-page__notice">{move || notice.get().unwrap_or_default()}</div>
            </Show>
            <form class="chat-page__composer" on:submit=on_submit>
                <textarea
                    class="chat-page__input"
                    rows="3"
                    placeholder="Type a message"
                    prop:value=move || draft.get()
                    on:input=move |ev| draft.set(event_target_value(&ev))
                    on:keydown=on_keydown
                ></textarea>
                <button
                    class="btn btn--primary btn--icon chat-page__send"
                    type="submit"
                    title="Send"
                    disabled=move || busy.get() || draft.with(|d| d.trim().is_empty())
                    inner_html=icons::markup("send")
                ></button>
            </form>
        </section>
    }
}
