//! Client side of a conversation: the transcript, the input buffer and the
//! single-flight send state machine.
//!
//! A conversation is either *idle* or *awaiting a reply*. `send` moves it from
//! idle to awaiting (appending the user message straight away), and the reply
//! or failure moves it back. A `send` while a reply is outstanding is dropped.
mod embedded;
mod relay_client;

pub use embedded::{AssistantSdk, EmbeddedBackend, ProviderSdk, normalize_sdk_reply};
pub use relay_client::RelayClient;

use crate::message::{Message, Role};
use crate::mode::Mode;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};

pub const NO_RESPONSE: &str = "No response.";
pub const SEND_FAILED: &str = "Something went wrong. Please try again.";
pub const STILL_INITIALIZING: &str =
    "Dragon AI is still initializing. Please try again in a moment.";

const EVENT_CAPACITY: usize = 64;

/// Assistant messages written by the client rather than the assistant.
fn is_local_notice(message: &Message) -> bool {
    message.role == Role::Assistant
        && [NO_RESPONSE, SEND_FAILED, STILL_INITIALIZING].contains(&message.content.as_str())
}

/// One user turn handed to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub input: String,
    pub mode: Option<Mode>,
    /// Transcript before this turn. Empty unless memory is enabled.
    pub history: Vec<Message>,
}

/// Where replies come from.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Whether the backend can take a request right now.
    fn is_ready(&self) -> bool {
        true
    }

    /// Requests a reply. `Ok(None)` means the backend answered without text.
    async fn reply(&self, turn: &ChatTurn) -> Result<Option<String>>;
}

/// Change notifications for front ends.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEvent {
    MessageAppended(Message),
    LoadingChanged(bool),
}

/// What a call to `send` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Empty input or a reply already outstanding.
    Ignored,
    /// The backend was not ready; a notice was appended instead.
    NotReady,
    Replied,
    Failed,
}

#[derive(Debug)]
pub struct ConversationState {
    messages: Vec<Message>,
    input: String,
    mode: Option<Mode>,
    awaiting_reply: bool,
}

impl ConversationState {
    pub fn new(mode: Option<Mode>) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            mode,
            awaiting_reply: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Option<Mode>) {
        self.mode = mode;
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn can_send(&self) -> bool {
        !self.awaiting_reply && !self.input.trim().is_empty()
    }

    /// The transcript as the backend should see it.
    ///
    /// Messages always come in user/assistant pairs here. A pair answered by a
    /// local notice carries no real reply, so it is left out.
    fn memory_history(&self) -> Vec<Message> {
        self.messages
            .chunks(2)
            .filter(|pair| !pair.iter().any(is_local_notice))
            .flatten()
            .cloned()
            .collect()
    }

    /// Appends the user message, clears the input and returns the turn to send.
    fn take_turn(&mut self, with_history: bool) -> (ChatTurn, Message) {
        let input = std::mem::take(&mut self.input);
        let history = if with_history {
            self.memory_history()
        } else {
            Vec::new()
        };
        let user = Message::user(input.clone());
        self.messages.push(user.clone());
        let turn = ChatTurn {
            input,
            mode: self.mode,
            history,
        };
        (turn, user)
    }

    /// Idle to awaiting-reply. `None` when the send guard rejects the input.
    pub fn begin_send(&mut self, with_history: bool) -> Option<(ChatTurn, Message)> {
        if !self.can_send() {
            return None;
        }
        let taken = self.take_turn(with_history);
        self.awaiting_reply = true;
        Some(taken)
    }

    /// Back to idle, appending the assistant message for `reply`.
    pub fn finish_send(&mut self, reply: &Result<Option<String>>) -> Message {
        let content = match reply {
            Ok(Some(text)) if !text.is_empty() => text.as_str(),
            Ok(_) => NO_RESPONSE,
            Err(_) => SEND_FAILED,
        };
        let assistant = Message::assistant(content);
        self.messages.push(assistant.clone());
        self.awaiting_reply = false;
        assistant
    }
}

/// A conversation bound to a backend.
pub struct Conversation {
    state: Mutex<ConversationState>,
    backend: Arc<dyn ChatBackend>,
    memory: bool,
    events: broadcast::Sender<ConversationEvent>,
}

impl Conversation {
    pub fn new(backend: Arc<dyn ChatBackend>, mode: Option<Mode>, memory: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(ConversationState::new(mode)),
            backend,
            memory,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.events.subscribe()
    }

    pub fn memory(&self) -> bool {
        self.memory
    }

    pub async fn set_input(&self, input: impl Into<String>) {
        self.state.lock().await.set_input(input);
    }

    pub async fn input(&self) -> String {
        self.state.lock().await.input().to_string()
    }

    pub async fn set_mode(&self, mode: Option<Mode>) {
        self.state.lock().await.set_mode(mode);
    }

    pub async fn mode(&self) -> Option<Mode> {
        self.state.lock().await.mode()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages().to_vec()
    }

    pub async fn is_awaiting_reply(&self) -> bool {
        self.state.lock().await.is_awaiting_reply()
    }

    fn emit(&self, event: ConversationEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Sends the current input and waits for the reply.
    ///
    /// The state lock is not held while the backend works, so a concurrent
    /// `send` sees the outstanding reply and returns `SendStatus::Ignored`.
    /// The returned future must be driven to completion: dropping it while the
    /// backend works leaves the conversation awaiting a reply.
    pub async fn send(&self) -> SendStatus {
        let turn = {
            let mut state = self.state.lock().await;
            if !state.can_send() {
                debug!("Send ignored");
                return SendStatus::Ignored;
            }

            if !self.backend.is_ready() {
                let (_, user) = state.take_turn(false);
                let notice = Message::assistant(STILL_INITIALIZING);
                state.messages.push(notice.clone());
                self.emit(ConversationEvent::MessageAppended(user));
                self.emit(ConversationEvent::MessageAppended(notice));
                return SendStatus::NotReady;
            }

            let Some((turn, user)) = state.begin_send(self.memory) else {
                return SendStatus::Ignored;
            };
            self.emit(ConversationEvent::MessageAppended(user));
            self.emit(ConversationEvent::LoadingChanged(true));
            turn
        };

        let reply = self.backend.reply(&turn).await;
        if let Err(err) = &reply {
            warn!("Reply failed: {err:?}");
        }

        let assistant = self.state.lock().await.finish_send(&reply);
        self.emit(ConversationEvent::MessageAppended(assistant));
        self.emit(ConversationEvent::LoadingChanged(false));

        if reply.is_ok() {
            SendStatus::Replied
        } else {
            SendStatus::Failed
        }
    }
}
