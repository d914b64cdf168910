//! Inline SVG icon set, registered once at bootstrap.
//!
//! Views look icons up by name; an unregistered set renders nothing, so
//! bootstrap registers before the first render.

#[cfg(test)]
#[path = "icons_test.rs"]
mod icons_test;

use std::collections::HashMap;
use std::sync::OnceLock;

static REGISTRY: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

const ICONS: &[(&str, &str)] = &[
    (
        "send",
        r#"<svg viewBox="0 0 20 20" aria-hidden="true"><path d="M2 10l16-7-7 16-2-7z"/></svg>"#,
    ),
    (
        "add",
        r#"<svg viewBox="0 0 20 20" aria-hidden="true"><line x1="10" y1="4" x2="10" y2="16"/><line x1="4" y1="10" x2="16" y2="10"/></svg>"#,
    ),
    (
        "delete",
        r#"<svg viewBox="0 0 20 20" aria-hidden="true"><path d="M5 6h10l-1 11H6zM8 3h4v2H8z"/></svg>"#,
    ),
    (
        "theme",
        r#"<svg viewBox="0 0 20 20" aria-hidden="true"><circle cx="10" cy="10" r="6"/><path d="M10 4a6 6 0 0 1 0 12z"/></svg>"#,
    ),
    (
        "thumb-up",
        r#"<svg viewBox="0 0 20 20" aria-hidden="true"><path d="M3 9h3v8H3zM7 17V9l4-6 1 1-1 4h5l1 2-2 7z"/></svg>"#,
    ),
    (
        "thumb-down",
        r#"<svg viewBox="0 0 20 20" aria-hidden="true"><path d="M3 3h3v8H3zM7 3v8l4 6 1-1-1-4h5l1-2-2-7z"/></svg>"#,
    ),
    (
        "warning",
        r#"<svg viewBox="0 0 20 20" aria-hidden="true"><path d="M10 2l9 16H1z"/><line x1="10" y1="8" x2="10" y2="12"/></svg>"#,
    ),
];

/// Register the icon set. Returns `false` if it was already registered.
pub fn register() -> bool {
    let mut fresh = false;
    REGISTRY.get_or_init(|| {
        fresh = true;
        ICONS.iter().copied().collect()
    });
    if fresh {
        log::debug!("registered {} icons", ICONS.len());
    }
    fresh
}

pub fn is_registered() -> bool {
    REGISTRY.get().is_some()
}

/// SVG markup for `name`, if the set is registered and knows it.
pub fn svg(name: &str) -> Option<&'static str> {
    REGISTRY.get().and_then(|icons| icons.get(name).copied())
}

/// Like [`svg`], but an empty string for unknown names so it can go
/// straight into `inner_html`.
pub fn markup(name: &str) -> &'static str {
    svg(name).unwrap_or_default()
}
