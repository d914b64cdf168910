//! # chat-client
//!
//! Leptos + WASM single-page chat client.
//!
//! This crate contains the conversation store shared by every view, the
//! hash-fragment route table, the layout shell and pages, and the streaming
//! client for the `/conversation` chat API. `bootstrap` wires them together
//! once at page load; the WASM entry point calls it.

pub mod app;
pub mod bootstrap;
pub mod components;
pub mod net;
pub mod pages;
pub mod routes;
pub mod state;
pub mod util;

/// WASM entry point. A bootstrap failure is thrown to the page as a JS error.
///
/// # Errors
///
/// Returns the bootstrap error message as a `JsValue`.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    bootstrap::bootstrap().map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))
}
