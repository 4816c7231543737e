pub mod app;
pub mod chat_service;
pub mod client;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod history;
pub mod identity;
pub mod message;
pub mod session;
pub mod settings;
pub mod storage;
pub mod view;
