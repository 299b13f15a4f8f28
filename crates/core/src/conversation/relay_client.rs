use crate::conversation::{ChatBackend, ChatTurn};
use crate::relay::RelayRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct ReplyBody {
    reply: Option<String>,
}

/// Talks to a relay over `POST /api/ai`.
pub struct RelayClient {
    url: String,
    client: reqwest::Client,
}

impl RelayClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatBackend for RelayClient {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn reply(&self, turn: &ChatTurn) -> Result<Option<String>> {
        let request = RelayRequest::new(turn.input.clone(), turn.mode, turn.history.clone());
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .context("Relay request failed")?;

        // Error bodies carry no `reply`, which reads as an empty answer.
        let status = response.status();
        let body: ReplyBody = response
            .json()
            .await
            .context("Relay returned an unreadable body")?;
        debug!(%status, has_reply = body.reply.is_some(), "Relay responded");
        Ok(body.reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::mode::Mode;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    fn turn(history: Vec<Message>) -> ChatTurn {
        ChatTurn {
            input: "Summarize: the sky is blue".to_string(),
            mode: Some(Mode::Summarize),
            history,
        }
    }

    #[tokio::test]
    async fn test_reply_posts_input_and_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai"))
            .and(body_json(json!({
                "input": "Summarize: the sky is blue",
                "mode": "summarize"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "Blue."})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RelayClient::new(format!("{}/api/ai", server.uri()));
        let reply = client.reply(&turn(vec![])).await.unwrap();
        assert_eq!(reply, Some("Blue.".to_string()));
    }

    #[tokio::test]
    async fn test_reply_posts_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai"))
            .and(body_json(json!({
                "input": "Summarize: the sky is blue",
                "mode": "summarize",
                "history": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RelayClient::new(format!("{}/api/ai", server.uri()));
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        assert_eq!(
            client.reply(&turn(history)).await.unwrap(),
            Some("ok".to_string())
        );
    }

    #[tokio::test]
    async fn test_error_body_reads_as_no_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "AI service error"})),
            )
            .mount(&server)
            .await;

        let client = RelayClient::new(format!("{}/api/ai", server.uri()));
        assert_eq!(client.reply(&turn(vec![])).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreadable_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = RelayClient::new(format!("{}/api/ai", server.uri()));
        assert!(client.reply(&turn(vec![])).await.is_err());
    }
}
