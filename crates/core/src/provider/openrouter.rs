use crate::config::RelayConfig;
use crate::message::Message;
use crate::provider::openai_types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::provider::{CompletionProvider, ProviderOutcome};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Client for OpenRouter and other OpenAI compatible chat completion endpoints.
pub struct OpenRouterProvider {
    config: RelayConfig,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    pub fn new(config: RelayConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: RelayConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    #[instrument(skip_all, fields(model = %self.config.model, messages = messages.len()))]
    async fn complete(&self, messages: &[Message]) -> Result<ProviderOutcome> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
        };

        let start_time = Instant::now();
        let response = self
            .client
            .post(&self.config.provider_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Completion request failed")?;

        // Error statuses still carry a JSON body describing the failure.
        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("Failed to read completion response")?;
        let latency_ms = start_time.elapsed().as_millis();
        debug!(%status, latency_ms, "Provider responded");

        let parsed: ChatCompletionResponse =
            serde_json::from_slice(&body).context("Provider returned a non-JSON body")?;
        let outcome = parsed.into_outcome();
        if let ProviderOutcome::Failed(err) = &outcome {
            warn!(%status, error = %err, "Provider returned no completion");
        }
        Ok(outcome)
    }
}
