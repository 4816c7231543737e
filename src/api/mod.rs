//! Request and response payloads of the remote chat service.

use serde::{Deserialize, Serialize};

pub mod client;

pub use client::{ChatApiError, ChatTransport, HttpChatClient};

use crate::core::settings::{Settings, Speed};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub speed: Speed,
    pub api_key: String,
}

impl ChatRequest {
    /// Builds the body from the message and a snapshot of the current settings.
    pub fn new(message: impl Into<String>, settings: &Settings) -> Self {
        Self {
            message: message.into(),
            speed: settings.speed,
            api_key: settings.effective_api_key().to_string(),
        }
    }
}

/// Successful reply of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    #[serde(alias = "response")]
    pub reply: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_carries_speed_and_key_in_fast_mode() {
        let settings = Settings {
            speed: Speed::Fast,
            api_key: "g-key".into(),
            ..Default::default()
        };
        let body = serde_json::to_value(ChatRequest::new("hi", &settings)).unwrap();
        assert_eq!(
            body,
            json!({"message": "hi", "speed": "Fast", "api_key": "g-key"})
        );
    }

    #[test]
    fn stale_key_is_not_sent_in_detailed_mode() {
        let settings = Settings {
            api_key: "left-over".into(),
            ..Default::default()
        };
        let body = serde_json::to_value(ChatRequest::new("hi", &settings)).unwrap();
        assert_eq!(
            body,
            json!({"message": "hi", "speed": "Detailed", "api_key": ""})
        );
    }

    #[test]
    fn reply_accepts_both_field_names() {
        let reply: ChatReply = serde_json::from_str(r#"{"reply":"a"}"#).unwrap();
        assert_eq!(reply.reply, "a");
        let legacy: ChatReply = serde_json::from_str(r#"{"response":"b"}"#).unwrap();
        assert_eq!(legacy.reply, "b");
        assert!(serde_json::from_str::<ChatReply>(r#"{"answer":"c"}"#).is_err());
    }
}
