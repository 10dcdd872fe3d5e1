use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ChatError, ChatResult};

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<serde_json::Value>,
}

/// The two calls the chat client makes against the remote service
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user turn and return the bot's reply text
    async fn send_message(&self, message: &str) -> ChatResult<String>;

    /// Drop the server-side conversation history
    async fn clear_chat(&self) -> ChatResult<()>;
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str, timeout: Duration) -> ChatResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        Ok(Self::with_client(base_url, client))
    }

    /// Use an already configured HTTP client
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    pub fn clear_url(&self) -> String {
        format!("{}/api/clear-chat", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn send_message(&self, message: &str) -> ChatResult<String> {
        let url = self.chat_url();
        debug!(%url, len = message.len(), "sending message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "chat response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "chat request failed");
            return Err(ChatError::Server {
                status: status.as_u16(),
                message: server_error_message(status.as_u16(), &body),
            });
        }

        let body = response.text().await?;
        parse_chat_reply(&body)
    }

    async fn clear_chat(&self) -> ChatResult<()> {
        let url = self.clear_url();
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Server {
                status: status.as_u16(),
                message: format!("HTTP error! status: {}", status.as_u16()),
            });
        }

        info!("chat history cleared on server");
        Ok(())
    }
}

/// Extract the reply from a 2xx body. A missing, empty or non-string
/// `response` field is a contract violation.
pub fn parse_chat_reply(body: &str) -> ChatResult<String> {
    let reply: ChatReply = serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "chat reply is not the expected JSON");
        ChatError::InvalidResponse
    })?;

    match reply.response {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ChatError::InvalidResponse),
    }
}

/// Text to display for a non-2xx reply: `detail`, then `message` from a JSON
/// body; the raw body if it isn't JSON; a generic status line otherwise.
pub fn server_error_message(status: u16, body: &str) -> String {
    let fallback = format!("HTTP error! status: {}", status);

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed
            .detail
            .and_then(display_field)
            .or_else(|| parsed.message.and_then(display_field))
            .unwrap_or(fallback),
        Err(_) => {
            let text = body.trim();
            if text.is_empty() {
                fallback
            } else {
                text.to_string()
            }
        }
    }
}

fn display_field(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_returns_response_field() {
        assert_eq!(parse_chat_reply(r#"{"response":"Hello"}"#), Ok("Hello".to_string()));
    }

    #[test]
    fn test_parse_reply_rejects_missing_field() {
        assert_eq!(parse_chat_reply("{}"), Err(ChatError::InvalidResponse));
        assert_eq!(parse_chat_reply(r#"{"response":""}"#), Err(ChatError::InvalidResponse));
        assert_eq!(parse_chat_reply(r#"{"response":42}"#), Err(ChatError::InvalidResponse));
        assert_eq!(parse_chat_reply("not json"), Err(ChatError::InvalidResponse));
    }

    #[test]
    fn test_server_error_prefers_detail_then_message() {
        assert_eq!(server_error_message(500, r#"{"detail":"overloaded"}"#), "overloaded");
        assert_eq!(
            server_error_message(400, r#"{"message":"bad input","detail":null}"#),
            "bad input"
        );
    }

    #[test]
    fn test_server_error_falls_back_to_status() {
        assert_eq!(server_error_message(502, "{}"), "HTTP error! status: 502");
        assert_eq!(server_error_message(503, "   "), "HTTP error! status: 503");
    }

    #[test]
    fn test_server_error_uses_plain_text_body() {
        assert_eq!(server_error_message(500, "Internal Server Error\n"), "Internal Server Error");
    }

    #[test]
    fn test_server_error_renders_structured_detail() {
        let msg = server_error_message(422, r#"{"detail":[{"msg":"field required"}]}"#);
        assert!(msg.contains("field required"));
    }

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let client = ChatClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.chat_url(), "http://localhost:8000/api/chat");
        assert_eq!(client.clear_url(), "http://localhost:8000/api/clear-chat");
    }
}
