//! Terminal front end for interactive chat sessions.
//!
//! - [`terminal`]: the [`crate::core::view::ViewSink`] that prints entries.
//! - [`chat_loop`]: reads typed lines, runs commands and exchanges.
//! - [`theme`]: light and dark palettes.
//!
//! Domain behavior stays in [`crate::core`]; this layer only presents it.

pub mod chat_loop;
pub mod terminal;
pub mod theme;
