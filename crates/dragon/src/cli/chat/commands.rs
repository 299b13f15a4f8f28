use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dragon_core::conversation::Conversation;
use dragon_core::message::format_transcript;
use dragon_core::mode::Mode;
use rustyline::completion::{Candidate, Completer};
use rustyline::error::ReadlineError;
use rustyline::hint::Hinter;
use rustyline::{Helper, Highlighter, Validator};

use crate::cli::ux::{ChatMessageType, style_chat_text};

// -------------
// REPL commands
// -------------
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct CliCommand {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show or switch the task mode.
    ///
    /// With no arguments, shows the current mode.
    /// Use "list" to see available modes, "none" to send messages as is.
    #[command(alias = "m")]
    Mode {
        /// Mode to switch to, "list" or "none"
        name: Option<String>,
    },
    /// Show the conversation so far
    History,
    /// Exit the chat session
    #[command(alias = "q", alias = "quit")]
    Exit,
}

impl Command {
    /// Executes a REPL command.
    ///
    /// Returns `Ok(false)` if the REPL should exit.
    pub async fn execute(self, conversation: &Conversation, out: &mut impl Write) -> Result<bool> {
        match self {
            Command::Mode { name: None } => {
                let current = conversation
                    .mode()
                    .await
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "none".to_string());
                writeln!(out, "Current mode: {current}")?;
            }
            Command::Mode { name: Some(name) } if name == "list" => {
                let current = conversation.mode().await;
                for mode in Mode::ALL {
                    let marker = if Some(mode) == current { "*" } else { " " };
                    writeln!(out, "{marker} {:<11} {}", mode.as_str(), mode.label())?;
                }
            }
            Command::Mode { name: Some(name) } if name == "none" => {
                conversation.set_mode(None).await;
                writeln!(out, "Mode cleared, messages are sent as is.")?;
            }
            Command::Mode { name: Some(name) } => match name.parse::<Mode>() {
                Ok(mode) => {
                    conversation.set_mode(Some(mode)).await;
                    writeln!(out, "Mode switched to: {}", mode.label())?;
                }
                Err(e) => {
                    let msg = e.to_string();
                    writeln!(out, "{}", style_chat_text(&msg, ChatMessageType::Error))?;
                }
            },
            Command::History => {
                let messages = conversation.messages().await;
                if messages.is_empty() {
                    writeln!(out, "No messages yet.")?;
                } else {
                    writeln!(out, "{}", format_transcript(&messages))?;
                }
            }
            Command::Exit => {
                writeln!(out, "Bye!")?;
                return Ok(false);
            }
        }
        Ok(true)
    }
}

// -------------
// REPL completion
// -------------
#[derive(Helper, Validator, Highlighter)]
pub struct Repl {
    pub command_names: Vec<String>,
    pub mode_names: Vec<String>,
}

#[derive(Debug)]
pub struct CompletionCandidate {
    text: String,
    display_string: String,
}

impl CompletionCandidate {
    pub fn new(text: &str) -> Self {
        let display_string = style_chat_text(text, ChatMessageType::Footer).to_string();
        Self {
            text: text.to_owned(),
            display_string,
        }
    }
}

impl Candidate for CompletionCandidate {
    fn display(&self) -> &str {
        &self.display_string
    }

    fn replacement(&self) -> &str {
        &self.text
    }
}

fn mode_compl(
    line: &str,
    pos: usize,
    mode_names: &[String],
) -> Result<(usize, Vec<CompletionCandidate>), ReadlineError> {
    let line_to_pos = &line[..pos];
    if let Some(space_pos) = line_to_pos.rfind(' ') {
        let prefix_start = space_pos + 1;
        let prefix = &line_to_pos[prefix_start..];
        let candidates = mode_names
            .iter()
            .map(String::as_str)
            .chain(["list", "none"])
            .filter(|name| name.starts_with(prefix))
            .map(CompletionCandidate::new)
            .collect();
        return Ok((prefix_start, candidates));
    }
    Ok((0, Vec::new()))
}

impl Completer for Repl {
    type Candidate = CompletionCandidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> Result<(usize, Vec<Self::Candidate>), ReadlineError> {
        if !line.starts_with('/') {
            return Ok((0, Vec::new()));
        }

        let args = shlex::split(line).unwrap_or_default();
        if let Ok(CliCommand {
            command: Command::Mode { .. },
        }) = CliCommand::try_parse_from(&args)
        {
            return mode_compl(line, pos, &self.mode_names);
        }

        let candidates = self
            .command_names
            .iter()
            .filter(|name| name.starts_with(line))
            .map(|name| CompletionCandidate::new(name))
            .collect();

        Ok((0, candidates))
    }
}

impl Hinter for Repl {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if line.is_empty() || pos < line.len() || !line.starts_with('/') {
            return None;
        }
        self.command_names
            .iter()
            .find(|&cmd_name| cmd_name.starts_with(line))
            .map(|cmd_name| cmd_name[line.len()..].into())
    }
}
