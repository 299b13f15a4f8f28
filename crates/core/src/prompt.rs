//! Prompt construction for the assistant persona.
use crate::config::PromptLayout;
use crate::message::{Message, format_transcript};
use crate::mode::Mode;

/// Identity preamble sent ahead of every request.
pub const SYSTEM_PROMPT: &str = "You are Dragon AI, a helpful assistant designed primarily for students and learning.

Behavior rules:
- If the user asks an academic, educational, or research-related question, respond in a clear, structured, and academic manner.
- If the user speaks casually or starts a normal conversation, respond naturally and friendly.
- Adjust tone automatically based on the user's message.
- Do NOT force academic tone on casual conversation.
- Do NOT use slang excessively.
- Be clear, helpful, and respectful.
- Do not encourage academic dishonesty.
- When explaining concepts, prioritize understanding over verbosity.

You are allowed to:
- Explain
- Summarize
- Paraphrase
- Chat casually
- Give examples
";

const HISTORY_HEADER: &str = "Conversation so far:";
const USER_HEADER: &str = "User message:";

/// The user's input, wrapped in the mode template when one is given.
pub fn task_prompt(input: &str, mode: Option<Mode>) -> String {
    match mode {
        Some(mode) => mode.apply(input),
        None => input.to_string(),
    }
}

/// Assembles the whole request as one prompt string.
///
/// Used by the single-message layout and by backends that only accept a
/// plain prompt.
pub fn assemble_prompt(input: &str, mode: Option<Mode>, history: &[Message]) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);
    if !history.is_empty() {
        prompt.push('\n');
        prompt.push_str(HISTORY_HEADER);
        prompt.push('\n');
        prompt.push_str(&format_transcript(history));
        prompt.push('\n');
    }
    prompt.push('\n');
    prompt.push_str(USER_HEADER);
    prompt.push('\n');
    prompt.push_str(&task_prompt(input, mode));
    prompt
}

/// Builds the provider message list for a request.
pub fn build_messages(
    layout: PromptLayout,
    input: &str,
    mode: Option<Mode>,
    history: &[Message],
) -> Vec<Message> {
    match layout {
        PromptLayout::SystemAndUser => {
            let mut messages = Vec::with_capacity(history.len() + 2);
            messages.push(Message::system(SYSTEM_PROMPT));
            messages.extend(history.iter().cloned());
            messages.push(Message::user(task_prompt(input, mode)));
            messages
        }
        PromptLayout::SingleUser => vec![Message::user(assemble_prompt(input, mode, history))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn test_task_prompt_without_mode_is_raw_input() {
        assert_eq!(task_prompt("hello there", None), "hello there");
    }

    #[test]
    fn test_system_and_user_layout() {
        let messages = build_messages(
            PromptLayout::SystemAndUser,
            "Summarize: the sky is blue",
            Some(Mode::Summarize),
            &[],
        );
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains(
            "Summarize the following text clearly and concisely using academic language:"
        ));
        assert!(messages[1].content.contains("Summarize: the sky is blue"));
    }

    #[test]
    fn test_system_and_user_layout_places_history_between() {
        let history = vec![Message::user("hi"), Message::assistant("hello!")];
        let messages = build_messages(PromptLayout::SystemAndUser, "and now?", None, &history);
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[3].content, "and now?");
    }

    #[test]
    fn test_single_user_layout() {
        let messages = build_messages(PromptLayout::SingleUser, "what is 2+2?", None, &[]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert!(messages[0].content.starts_with(SYSTEM_PROMPT));
        assert!(messages[0].content.ends_with("User message:\nwhat is 2+2?"));
        assert!(!messages[0].content.contains(HISTORY_HEADER));
    }

    #[test]
    fn test_assemble_prompt_with_history_and_mode() {
        let history = vec![Message::user("Tell me about mitosis")];
        let prompt = assemble_prompt("cell division", Some(Mode::Quiz), &history);
        assert!(prompt.contains("Conversation so far:\nUser: Tell me about mitosis"));
        assert!(prompt.contains(Mode::Quiz.instruction()));
        assert!(prompt.ends_with("cell division"));
    }
}
