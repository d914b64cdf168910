//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render the app chrome and transcript pieces while reading the
//! session snapshot from Leptos context and writing through the store.

pub mod conversation_list;
pub mod layout;
pub mod message_view;
