//! Root application component with the store provider and hash routing.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};

use crate::components::layout::Layout;
use crate::pages::{chat::ChatPage, not_found::NotFoundPage};
use crate::routes::{AppRoute, current_fragment, resolve};
use crate::state::{ConversationStore, SessionState};
use crate::util::theme;

/// Root application component.
///
/// Provides the conversation store (and a reactive mirror of its snapshot)
/// above the route switch, so every routed view, the fallback included,
/// shares the one store. Views read `ReadSignal<SessionState>` and write
/// through `ConversationStore::dispatch`.
#[component]
pub fn App(store: ConversationStore) -> impl IntoView {
    provide_meta_context();

    let Ok(initial) = store.get_state() else {
        log::error!("App mounted before the conversation store was initialized");
        return view! { <p class="fatal">"Conversation store not initialized."</p> }.into_any();
    };

    let snapshot = RwSignal::new(initial);
    let subscription = store.subscribe(move |next| snapshot.set(next.clone()));
    let cleanup_store = store.clone();
    on_cleanup(move || {
        cleanup_store.unsubscribe(subscription);
    });

    provide_context(store);
    provide_context::<ReadSignal<SessionState>>(snapshot.read_only());
    provide_context(RwSignal::new(theme::read_preference()));

    let fragment = RwSignal::new(current_fragment());
    #[cfg(feature = "csr")]
    {
        let handle = window_event_listener(leptos::ev::hashchange, move |_| fragment.set(current_fragment()));
        on_cleanup(move || handle.remove());
    }
    let route = Memo::new(move |_| resolve(&fragment.get()));

    view! {
        <Title text="Chat"/>
        <Layout>
            {move || match route.get() {
                AppRoute::Chat => view! { <ChatPage/> }.into_any(),
                AppRoute::NotFound { path } => view! { <NotFoundPage path=path/> }.into_any(),
            }}
        </Layout>
    }
    .into_any()
}
