//! A mock completion provider for unit testing purposes.
use crate::message::Message;
use crate::provider::{CompletionProvider, ProviderOutcome, UpstreamError};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Mutex;

/// How the `TestProvider` answers every call.
#[derive(Debug, Clone)]
pub enum TestResponse {
    /// Echo a fixed reply.
    Reply(String),
    /// A well-formed response without a completion.
    Upstream(String),
    /// A transport fault.
    Fault,
}

/// A `CompletionProvider` that records the messages it receives.
#[derive(Debug)]
pub struct TestProvider {
    response: TestResponse,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl TestProvider {
    pub fn new(response: TestResponse) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(TestResponse::Reply(text.to_string()))
    }

    /// Messages of every call made so far.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for TestProvider {
    async fn complete(&self, messages: &[Message]) -> Result<ProviderOutcome> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match &self.response {
            TestResponse::Reply(text) => Ok(ProviderOutcome::Completed(text.clone())),
            TestResponse::Upstream(msg) => Ok(ProviderOutcome::Failed(UpstreamError::new(msg))),
            TestResponse::Fault => Err(anyhow!("TestProvider connection refused")),
        }
    }
}
