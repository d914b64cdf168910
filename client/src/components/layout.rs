//! Layout shell rendered around every route.

use leptos::prelude::*;

use crate::components::conversation_list::ConversationList;
use crate::routes::AppRoute;
use crate::util::icons;
use crate::util::theme::{self, Theme};

/// Header chrome, conversation sidebar, and a slot for the routed view.
/// Renders for every route, including the not-found fallback.
#[component]
pub fn Layout(children: Children) -> impl IntoView {
    let theme_signal = expect_context::<RwSignal<Theme>>();

    let on_toggle_theme = move |_| theme_signal.update(|t| *t = theme::toggle(*t));

    view! {
        <div class="layout">
            <header class="layout__header">
                <a class="layout__brand" href=AppRoute::Chat.href()>
                    "Chat"
                </a>
                <button
                    class="btn btn--icon layout__theme"
                    title=move || format!("Switch to {} theme", theme_signal.get().toggled().as_str())
                    on:click=on_toggle_theme
                    inner_html=icons::markup("theme")
                ></button>
            </header>
            <div class="layout__body">
                <aside class="layout__sidebar">
                    <ConversationList/>
                </aside>
                <main class="layout__content">{children()}</main>
            </div>
        </div>
    }
}
