use std::sync::Arc;

use anyhow::Result;
use dragon_core::config::{Config, RelaySettings};
use dragon_core::conversation::{
    ChatBackend, Conversation, EmbeddedBackend, ProviderSdk, RelayClient,
};
use dragon_core::mode::Mode;
use dragon_core::provider::OpenRouterProvider;
use tracing::{debug, warn};

use crate::cli::ux::{ChatMessageType, style_chat_text};

mod commands;
mod repl;

pub const THINKING: &str = "Dragon AI is thinking…";

/// Chat options after merging command line flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub mode: Option<Mode>,
    pub memory: bool,
    pub embedded: bool,
    pub relay_url: String,
}

/// Brings the in-process assistant up in the background.
fn spawn_embedded_init(backend: Arc<EmbeddedBackend>, settings: RelaySettings) {
    tokio::spawn(async move {
        match settings.resolve() {
            Ok(relay_config) => {
                let provider = Arc::new(OpenRouterProvider::new(relay_config));
                backend.install(Arc::new(ProviderSdk::new(provider)));
                debug!("Embedded assistant ready");
            }
            Err(e) => {
                warn!("Embedded assistant unavailable: {e}");
                let msg = format!("Assistant unavailable: {e}");
                eprintln!("{}", style_chat_text(&msg, ChatMessageType::Error));
            }
        }
    });
}

fn backend_for(options: &ChatOptions, config: &Config) -> Arc<dyn ChatBackend> {
    if options.embedded {
        let backend = Arc::new(EmbeddedBackend::new());
        spawn_embedded_init(backend.clone(), config.relay.clone());
        backend
    } else {
        Arc::new(RelayClient::new(options.relay_url.clone()))
    }
}

/// Executes the chat command, starting an interactive REPL session.
pub async fn execute(options: ChatOptions, config: &Config) -> Result<()> {
    debug!(?options, "Starting chat");
    let backend = backend_for(&options, config);
    let conversation = Arc::new(Conversation::new(backend, options.mode, options.memory));
    repl::run(conversation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn options(embedded: bool) -> ChatOptions {
        ChatOptions {
            mode: Some(Mode::Summarize),
            memory: false,
            embedded,
            relay_url: "http://127.0.0.1:3000/api/ai".to_string(),
        }
    }

    #[tokio::test]
    async fn test_relay_backend_is_ready_immediately() {
        let backend = backend_for(&options(false), &Config::default());
        assert!(backend.is_ready());
    }

    #[tokio::test]
    async fn test_embedded_backend_becomes_ready() {
        let mut config = Config::default();
        config.relay.api_key = "sk-test".to_string();
        let backend = backend_for(&options(true), &config);

        tokio::time::timeout(Duration::from_secs(5), async {
            while !backend.is_ready() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_embedded_backend_without_key_stays_initializing() {
        let mut config = Config::default();
        config.relay.api_key = "env:DRAGON_TEST_CHAT_UNSET_KEY".to_string();
        let backend = backend_for(&options(true), &config);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!backend.is_ready());
    }
}
