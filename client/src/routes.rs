//! Hash-fragment route table.
//!
//! The URL fragment is the only routing input. `#/` (and an empty fragment)
//! is the chat view; every other path falls through to the not-found view,
//! so no fragment is ever unhandled.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

/// A resolved route. Both variants render inside the layout shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppRoute {
    /// Index route.
    Chat,
    /// Catch-all carrying the normalized path that did not match.
    NotFound { path: String },
}

impl AppRoute {
    /// Canonical fragment for linking to this route.
    pub fn href(&self) -> String {
        match self {
            Self::Chat => "#/".to_owned(),
            Self::NotFound { path } => format!("#{path}"),
        }
    }

    pub const fn is_chat(&self) -> bool {
        matches!(self, Self::Chat)
    }
}

/// Strip the leading `#` and any `?query`, and make sure the path starts with `/`.
pub fn normalize(fragment: &str) -> String {
    let raw = fragment.strip_prefix('#').unwrap_or(fragment);
    let path = raw.split_once('?').map_or(raw, |(p, _)| p);
    if path.starts_with('/') { path.to_owned() } else { format!("/{path}") }
}

/// Resolve a URL fragment (`window.location.hash`) to the view to render.
pub fn resolve(fragment: &str) -> AppRoute {
    let path = normalize(fragment);
    match path.as_str() {
        "/" => AppRoute::Chat,
        _ => AppRoute::NotFound { path },
    }
}

/// The current fragment of the page, or `""` outside the browser.
pub fn current_fragment() -> String {
    #[cfg(feature = "csr")]
    {
        web_sys::window().and_then(|w| w.location().hash().ok()).unwrap_or_default()
    }
    #[cfg(not(feature = "csr"))]
    {
        String::new()
    }
}

/// Point the browser at `route`. The `hashchange` listener re-resolves.
pub fn navigate(route: &AppRoute) {
    #[cfg(feature = "csr")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_hash(&route.href());
        }
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = route;
    }
}
