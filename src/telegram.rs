use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

/// Body of a `sendMessage` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

impl SendMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to_message_id: None,
        }
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }
}

/// Outbound "send message" capability
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, request: &SendMessage) -> Result<()>;
}

/// Telegram Bot API client
pub struct TelegramApi {
    client: reqwest::Client,
    /// e.g. `https://api.telegram.org/bot<token>`, without a trailing slash
    api_url: String,
}

impl TelegramApi {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_url, method)
    }
}

#[async_trait]
impl MessageSender for TelegramApi {
    async fn send_message(&self, request: &SendMessage) -> Result<()> {
        let url = self.method_url("sendMessage");

        debug!("Sending message to chat {}", request.chat_id);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to send request to Telegram")?;

        // Only transport errors fail the send; API rejections are logged.
        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(
                "Telegram API rejected message to chat {} ({}): {}",
                request.chat_id, status, error_body
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_reply_to_omitted_when_absent() {
        let body = serde_json::to_value(SendMessage::new(100, "hi")).unwrap();
        assert_eq!(body, json!({"chat_id": 100, "text": "hi"}));
    }

    #[test]
    fn test_reply_to_serialized() {
        let body = serde_json::to_value(SendMessage::new(100, "hi").reply_to(5)).unwrap();
        assert_eq!(
            body,
            json!({"chat_id": 100, "text": "hi", "reply_to_message_id": 5})
        );
    }

    #[tokio::test]
    async fn test_send_message_posts_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_json(json!({
                "chat_id": 100,
                "text": "Welcome",
                "reply_to_message_id": 5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = TelegramApi::new(format!("{}/botTOKEN", mock_server.uri()));
        api.send_message(&SendMessage::new(100, "Welcome").reply_to(5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_message_api_error_is_not_fatal() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/sendMessage"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request: chat not found"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = TelegramApi::new(mock_server.uri());
        let result = api.send_message(&SendMessage::new(1, "hello")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_message_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = TelegramApi::new(format!("http://{addr}"));
        let err = api
            .send_message(&SendMessage::new(1, "hello"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to send request"));
    }
}
