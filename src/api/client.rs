use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;
use tracing::debug;

use crate::api::{ChatReply, ChatRequest};

/// Failure of a chat or history request. Only ever logged; the conversation
/// shows a fixed fallback instead.
#[derive(Debug)]
pub enum ChatApiError {
    /// The request never produced an HTTP response.
    Transport(reqwest::Error),

    /// The service answered with a non-success status.
    Status { status: u16, body: String },

    /// A success status whose body is not the expected JSON.
    Decode(String),
}

impl fmt::Display for ChatApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatApiError::Transport(err) => write!(f, "request failed: {err}"),
            ChatApiError::Status { status, body } => {
                write!(f, "service returned status {status}: {}", body.trim())
            }
            ChatApiError::Decode(detail) => write!(f, "unexpected response body: {detail}"),
        }
    }
}

impl StdError for ChatApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ChatApiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatApiError {
    fn from(err: reqwest::Error) -> Self {
        ChatApiError::Transport(err)
    }
}

/// The remote side of a chat session.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ChatApiError>;

    /// Purges the server-side history of this session.
    async fn clear_history(&self) -> Result<(), ChatApiError>;
}

#[derive(Clone)]
pub struct HttpChatClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpChatClient {
    pub const CHAT_ENDPOINT: &'static str = "api/chat";
    pub const CLEAR_HISTORY_ENDPOINT: &'static str = "clear_history";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        endpoint_url(&self.base_url, endpoint)
    }
}

/// Joins a base URL and an endpoint path without doubling slashes.
fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ChatApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    Err(ChatApiError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ChatTransport for HttpChatClient {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ChatApiError> {
        let url = self.url(Self::CHAT_ENDPOINT);
        debug!(%url, speed = request.speed.as_str(), "sending chat request");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let body = response.text().await?;
        serde_json::from_str::<ChatReply>(&body).map_err(|err| ChatApiError::Decode(err.to_string()))
    }

    async fn clear_history(&self) -> Result<(), ChatApiError> {
        let url = self.url(Self::CLEAR_HISTORY_ENDPOINT);
        debug!(%url, "purging server history");
        let response = self.client.post(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
