//! A backend that calls an in-process assistant instead of the relay.
//!
//! The assistant may come up after the conversation starts, so the backend
//! begins empty and reports itself not ready until one is installed.
use crate::conversation::{ChatBackend, ChatTurn};
use crate::message::Message;
use crate::prompt::assemble_prompt;
use crate::provider::{CompletionProvider, ProviderOutcome};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

/// An assistant that takes one assembled prompt.
///
/// Replies come back in whatever shape the assistant likes; see
/// [`normalize_sdk_reply`].
#[async_trait]
pub trait AssistantSdk: Send + Sync {
    async fn chat(&self, prompt: &str) -> Result<Value>;
}

/// Extracts the reply text from a plain string or an object exposing
/// `message.content`, `content` or `text`, in that order.
pub fn normalize_sdk_reply(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .or_else(|| map.get("content").and_then(Value::as_str))
            .or_else(|| map.get("text").and_then(Value::as_str)),
        _ => None,
    };
    text.filter(|t| !t.is_empty()).map(str::to_string)
}

#[derive(Default)]
pub struct EmbeddedBackend {
    sdk: OnceCell<Arc<dyn AssistantSdk>>,
}

impl EmbeddedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sdk(sdk: Arc<dyn AssistantSdk>) -> Self {
        let backend = Self::new();
        backend.install(sdk);
        backend
    }

    /// Makes the assistant available. Returns `false` if one was already installed.
    pub fn install(&self, sdk: Arc<dyn AssistantSdk>) -> bool {
        self.sdk.set(sdk).is_ok()
    }
}

#[async_trait]
impl ChatBackend for EmbeddedBackend {
    fn is_ready(&self) -> bool {
        self.sdk.get().is_some()
    }

    #[instrument(skip_all)]
    async fn reply(&self, turn: &ChatTurn) -> Result<Option<String>> {
        let sdk = self
            .sdk
            .get()
            .ok_or_else(|| anyhow!("Assistant is not initialized"))?;
        let prompt = assemble_prompt(&turn.input, turn.mode, &turn.history);
        let value = sdk.chat(&prompt).await?;
        debug!("Assistant replied");
        Ok(normalize_sdk_reply(&value))
    }
}

/// Serves the assistant from a completion provider.
pub struct ProviderSdk {
    provider: Arc<dyn CompletionProvider>,
}

impl ProviderSdk {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl AssistantSdk for ProviderSdk {
    async fn chat(&self, prompt: &str) -> Result<Value> {
        match self.provider.complete(&[Message::user(prompt)]).await? {
            ProviderOutcome::Completed(text) => Ok(json!({"message": {"content": text}})),
            ProviderOutcome::Failed(err) => Err(err.into()),
        }
    }
}
