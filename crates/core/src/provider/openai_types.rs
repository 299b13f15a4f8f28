use crate::message::Message;
use crate::provider::{ProviderOutcome, UpstreamError};
use serde::{Deserialize, Serialize};

pub(super) const GENERIC_UPSTREAM_ERROR: &str = "AI service error";

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest<'a> {
    pub(super) model: &'a str,
    pub(super) messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionResponse {
    pub(super) choices: Option<Vec<ChatCompletionChoice>>,
    // Providers disagree on the shape of this field
    pub(super) error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionChoice {
    pub(super) message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResponseMessage {
    pub(super) content: Option<String>,
}

impl ChatCompletionResponse {
    fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    /// Decodes the first completion's text, or the reason there is none.
    pub(super) fn into_outcome(self) -> ProviderOutcome {
        let message = self.error_message();
        let text = self
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|m| m.content);

        match text {
            Some(text) => ProviderOutcome::Completed(text),
            None => ProviderOutcome::Failed(UpstreamError::new(
                message.unwrap_or_else(|| GENERIC_UPSTREAM_ERROR.to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::completion_body;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> ProviderOutcome {
        serde_json::from_value::<ChatCompletionResponse>(value)
            .unwrap()
            .into_outcome()
    }

    #[test]
    fn test_completed_response() {
        assert_eq!(
            decode(completion_body("The sky is blue.")),
            ProviderOutcome::Completed("The sky is blue.".to_string())
        );
    }

    #[test]
    fn test_error_message_passthrough() {
        let outcome = decode(json!({"error": {"message": "Rate limit exceeded", "code": 429}}));
        assert_eq!(
            outcome,
            ProviderOutcome::Failed(UpstreamError::new("Rate limit exceeded"))
        );
    }

    #[test]
    fn test_missing_choices_without_error() {
        assert_eq!(
            decode(json!({})),
            ProviderOutcome::Failed(UpstreamError::new(GENERIC_UPSTREAM_ERROR))
        );
        // A string error carries no message field.
        assert_eq!(
            decode(json!({"error": "bad things"})),
            ProviderOutcome::Failed(UpstreamError::new(GENERIC_UPSTREAM_ERROR))
        );
    }

    #[test]
    fn test_empty_choices_and_null_content() {
        assert_eq!(
            decode(json!({"choices": []})),
            ProviderOutcome::Failed(UpstreamError::new(GENERIC_UPSTREAM_ERROR))
        );
        assert_eq!(
            decode(json!({"choices": [{"message": {"role": "assistant", "content": null}}]})),
            ProviderOutcome::Failed(UpstreamError::new(GENERIC_UPSTREAM_ERROR))
        );
    }

    #[test]
    fn test_request_serializes_model_and_messages() {
        let messages = vec![Message::system("persona"), Message::user("hi")];
        let request = ChatCompletionRequest {
            model: "openai/gpt-4o-mini",
            messages: &messages,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "openai/gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "hi"}
                ]
            })
        );
    }
}
