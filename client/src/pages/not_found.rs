//! Fallback view for fragments that match no route.

use leptos::prelude::*;

use crate::routes::AppRoute;

/// Shown inside the layout for unknown paths.
#[component]
pub fn NotFoundPage(path: String) -> impl IntoView {
    view! {
        <section class="not-found">
            <h1>"Page not found"</h1>
            <p class="not-found__path">"No page at " <code>{path}</code></p>
            <a class="btn btn--primary" href=AppRoute::Chat.href()>
                "Back to chat"
            </a>
        </section>
    }
}
