//! Guardian is the chat client of the Guardian legal-assistance service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chat session: settings, identity, conversation
//!   rendering, the request/response cycle and history.
//! - [`api`] defines the wire payloads and the HTTP transport to the chat
//!   service.
//! - [`ui`] renders a session on the terminal and runs the interactive loop.
//! - [`commands`] implements the slash commands available inside a chat.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
