//! Completion provider adapters.
mod openai_types;
mod openrouter;
#[cfg(test)]
pub(crate) mod test_provider;

pub use openrouter::OpenRouterProvider;

use crate::message::Message;
use anyhow::Result;
use async_trait::async_trait;

/// The provider answered but produced no usable completion.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct UpstreamError {
    pub message: String,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A decoded provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    Completed(String),
    Failed(UpstreamError),
}

/// A hosted chat completion endpoint.
///
/// `Err` is reserved for transport and decoding faults; a well-formed response
/// without a completion is `Ok(ProviderOutcome::Failed(..))`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<ProviderOutcome>;
}
