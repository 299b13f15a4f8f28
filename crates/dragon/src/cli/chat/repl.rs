use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use dragon_core::conversation::{Conversation, ConversationEvent, SendStatus};
use dragon_core::message::Role;
use dragon_core::mode::Mode;
use rustyline::error::ReadlineError;
use rustyline::{CompletionType, Editor};
use tokio::sync::broadcast;
use tracing::debug;

use crate::cli::chat::THINKING;
use crate::cli::chat::commands::{CliCommand, Repl};
use crate::cli::ux::{ChatMessageType, GenerationSpinner, format_prompt_meta, style_chat_text};

/// Draws conversation events: a spinner while loading, replies as they land.
#[derive(Default)]
struct EventRenderer {
    spinner: Option<GenerationSpinner>,
}

impl EventRenderer {
    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.clear();
        }
    }

    fn render(&mut self, event: ConversationEvent, out: &mut impl Write) -> Result<()> {
        match event {
            ConversationEvent::LoadingChanged(true) => {
                self.spinner = Some(GenerationSpinner::new(THINKING.to_string()));
            }
            ConversationEvent::LoadingChanged(false) => self.stop_spinner(),
            ConversationEvent::MessageAppended(message) if message.role == Role::Assistant => {
                self.stop_spinner();
                writeln!(
                    out,
                    "\n{}",
                    style_chat_text(&message.content, ChatMessageType::Assistant)
                )?;
                out.flush()?;
            }
            // The user already sees what they typed
            ConversationEvent::MessageAppended(_) => {}
        }
        Ok(())
    }
}

/// Sends `line` and renders events until the reply is in.
async fn process_message(
    conversation: &Conversation,
    line: &str,
    events: &mut broadcast::Receiver<ConversationEvent>,
    renderer: &mut EventRenderer,
    out: &mut impl Write,
) -> Result<SendStatus> {
    conversation.set_input(line).await;

    // Drawing errors are held until the send completes.
    let send = conversation.send();
    tokio::pin!(send);
    let mut rendered = Ok(());
    let status = loop {
        tokio::select! {
            status = &mut send => break status,
            event = events.recv() => {
                if let Ok(event) = event
                    && rendered.is_ok()
                {
                    rendered = renderer.render(event, out);
                }
            }
        }
    };

    while let Ok(event) = events.try_recv() {
        if rendered.is_ok() {
            rendered = renderer.render(event, out);
        }
    }
    renderer.stop_spinner();
    debug!(?status, "Message processed");
    rendered?;
    Ok(status)
}

/// Runs the interactive REPL for the conversation.
pub async fn run(conversation: Arc<Conversation>) -> Result<()> {
    println!("Welcome to Dragon AI! Type '/help' for commands, '/q' to exit.");

    let config = rustyline::Config::builder()
        .history_ignore_dups(true)?
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let command_names = CliCommand::command()
        .get_subcommands()
        .flat_map(|c| c.get_name_and_visible_aliases())
        .map(|s| format!("/{s}"))
        .collect::<Vec<_>>();
    let mode_names = Mode::ALL.iter().map(|m| m.to_string()).collect();

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(Repl {
        command_names,
        mode_names,
    }));

    let mut events = conversation.subscribe();
    let mut renderer = EventRenderer::default();
    let mut stdout = std::io::stdout();

    loop {
        let prompt = {
            let meta = format_prompt_meta(conversation.mode().await, conversation.memory());
            format!(
                "\n{}\n{}",
                style_chat_text(&meta, ChatMessageType::Prompt),
                style_chat_text("> ", ChatMessageType::Prompt)
            )
        };
        match rl.readline(&prompt) {
            Ok(line) => {
                rl.add_history_entry(&line)?;
                let trimmed_line = line.trim();

                if trimmed_line.is_empty() {
                    continue;
                }

                if trimmed_line.starts_with('/') {
                    let args = shlex::split(trimmed_line).unwrap_or_default();
                    match CliCommand::try_parse_from(args) {
                        Ok(cli_command) => {
                            if !cli_command
                                .command
                                .execute(&conversation, &mut stdout)
                                .await?
                            {
                                return Ok(());
                            }
                        }
                        Err(e) => {
                            e.print()?;
                        }
                    }
                } else {
                    process_message(
                        &conversation,
                        &line,
                        &mut events,
                        &mut renderer,
                        &mut stdout,
                    )
                    .await?;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Type /quit to exit.");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nBye!");
                return Ok(());
            }
            Err(err) => {
                return Err(err.into());
            }
        }
    }
}
