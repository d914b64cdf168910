//! Sidebar listing the session's conversations, most recent first.

use leptos::prelude::*;

use crate::routes::{AppRoute, navigate};
use crate::state::{Action, ConversationStore, SessionState};
use crate::util::icons;

/// Conversation sidebar with new/select/delete actions.
#[component]
pub fn ConversationList() -> impl IntoView {
    let store = StoredValue::new(expect_context::<ConversationStore>());
    let state = expect_context::<ReadSignal<SessionState>>();

    let dispatch = move |action: Action| {
        if let Err(e) = store.with_value(|s| s.dispatch(action)) {
            log::warn!("sidebar action failed: {e}");
            return false;
        }
        true
    };

    let on_new = move |_| {
        if dispatch(Action::StartConversation { title: None }) {
            navigate(&AppRoute::Chat);
        }
    };

    view! {
        <div class="conversation-list">
            <button class="btn btn--primary conversation-list__new" on:click=on_new>
                <span class="icon" inner_html=icons::markup("add")></span>
                "New chat"
            </button>
            <ul class="conversation-list__items">
                {move || {
                    let snapshot = state.get();
                    let active = snapshot.active.clone();
                    snapshot
                        .conversations_by_recent()
                        .into_iter()
                        .map(|c| {
                            let id = c.id.clone();
                            let delete_id = c.id.clone();
                            let is_active = active.as_deref() == Some(c.id.as_str());
                            let streaming = c.is_streaming();
                            let title = c.title.clone();
                            view! {
                                <li
                                    class="conversation-list__item"
                                    class:conversation-list__item--active=is_active
                                    class:conversation-list__item--streaming=streaming
                                >
                                    <button
                                        class="conversation-list__select"
                                        on:click=move |_| {
                                            if dispatch(Action::SelectConversation { id: id.clone() }) {
                                                navigate(&AppRoute::Chat);
                                            }
                                        }
                                    >
                                        {title}
                                    </button>
                                    <button
                                        class="btn btn--icon conversation-list__delete"
                                        title="Delete conversation"
                                        on:click=move |_| {
                                            dispatch(Action::DeleteConversation { id: delete_id.clone() });
                                        }
                                        inner_html=icons::markup("delete")
                                    ></button>
                                </li>
                            }
                        })
                        .collect::<Vec<_>>()
                }}
            </ul>
        </div>
    }
}
