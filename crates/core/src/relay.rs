//! The relay turns a chat request into one provider completion call.
use crate::config::RelayConfig;
use crate::message::{Message, Role};
use crate::mode::Mode;
use crate::prompt::build_messages;
use crate::provider::{CompletionProvider, OpenRouterProvider, ProviderOutcome, UpstreamError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub const INPUT_REQUIRED: &str = "Input is required";
pub const INVALID_MODE: &str = "Invalid mode";
pub const INVALID_HISTORY: &str = "History may only contain user and assistant messages";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Body of `POST /api/ai`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RelayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Prior transcript, sent by clients with memory enabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,
}

impl RelayRequest {
    pub fn new(input: impl Into<String>, mode: Option<Mode>, history: Vec<Message>) -> Self {
        Self {
            input: Some(input.into()),
            mode: mode.map(|m| m.as_str().to_string()),
            history,
        }
    }

    /// Decodes a request body.
    ///
    /// Only a body that is not JSON at all is an internal error. Fields of the
    /// wrong type fail validation in the usual order: input, mode, history.
    pub fn from_slice(body: &[u8]) -> Result<Self, RelayError> {
        let body: Value = serde_json::from_slice(body).map_err(|e| {
            RelayError::Internal(anyhow::Error::new(e).context("Invalid request body"))
        })?;

        let input = present_field(&body, "input")
            .and_then(Value::as_str)
            .filter(|i| !i.trim().is_empty())
            .ok_or(RelayError::Validation(INPUT_REQUIRED))?;

        let mode = match present_field(&body, "mode") {
            None => None,
            Some(Value::String(mode)) if mode.parse::<Mode>().is_ok() => Some(mode.clone()),
            Some(_) => return Err(RelayError::Validation(INVALID_MODE)),
        };

        let history = match present_field(&body, "history") {
            None => Vec::new(),
            Some(history) => serde_json::from_value(history.clone())
                .map_err(|_| RelayError::Validation(INVALID_HISTORY))?,
        };

        Ok(Self {
            input: Some(input.to_string()),
            mode,
            history,
        })
    }
}

/// A body field that is present and not `null`.
fn present_field<'a>(body: &'a Value, name: &str) -> Option<&'a Value> {
    body.get(name).filter(|v| !v.is_null())
}

/// Response body of `POST /api/ai`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Reply { reply: String },
    Error { error: String },
}

#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    /// Bad or missing client input.
    #[error("{0}")]
    Validation(&'static str),
    /// The provider produced no usable completion.
    #[error("{0}")]
    Upstream(#[from] UpstreamError),
    /// Anything unexpected. Details stay in the logs.
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl RelayError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::Validation(_))
    }
}

impl From<RelayError> for RelayResponse {
    fn from(err: RelayError) -> Self {
        RelayResponse::Error {
            error: err.to_string(),
        }
    }
}

/// A request that passed validation.
#[derive(Debug)]
struct ValidRequest {
    input: String,
    mode: Option<Mode>,
    history: Vec<Message>,
}

fn validate(request: RelayRequest) -> Result<ValidRequest, RelayError> {
    let input = request
        .input
        .filter(|i| !i.trim().is_empty())
        .ok_or(RelayError::Validation(INPUT_REQUIRED))?;

    let mode = request
        .mode
        .map(|m| m.parse::<Mode>())
        .transpose()
        .map_err(|_| RelayError::Validation(INVALID_MODE))?;

    if request.history.iter().any(|m| m.role == Role::System) {
        return Err(RelayError::Validation(INVALID_HISTORY));
    }

    Ok(ValidRequest {
        input,
        mode,
        history: request.history,
    })
}

/// Stateless relay between chat clients and the completion provider.
#[derive(Clone)]
pub struct RelayService {
    config: RelayConfig,
    provider: Arc<dyn CompletionProvider>,
}

impl RelayService {
    pub fn new(config: RelayConfig) -> Self {
        let provider = Arc::new(OpenRouterProvider::new(config.clone()));
        Self { config, provider }
    }

    pub fn with_provider(config: RelayConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Validates the request, calls the provider once and returns the reply text.
    #[instrument(skip_all, fields(mode = request.mode.as_deref().unwrap_or("none")))]
    pub async fn reply(&self, request: RelayRequest) -> Result<String, RelayError> {
        let request = validate(request)?;
        let messages = build_messages(
            self.config.prompt_layout,
            &request.input,
            request.mode,
            &request.history,
        );

        match self.provider.complete(&messages).await {
            Ok(ProviderOutcome::Completed(text)) => {
                debug!(chars = text.len(), "Relayed completion");
                Ok(text)
            }
            Ok(ProviderOutcome::Failed(err)) => Err(RelayError::Upstream(err)),
            Err(err) => {
                error!("Provider call failed: {err:?}");
                Err(RelayError::Internal(err))
            }
        }
    }

    /// Handles a raw request body and returns the response body.
    pub async fn handle(&self, body: &[u8]) -> Result<RelayResponse, RelayError> {
        let request = RelayRequest::from_slice(body)?;
        let reply = self.reply(request).await?;
        Ok(RelayResponse::Reply { reply })
    }
}
