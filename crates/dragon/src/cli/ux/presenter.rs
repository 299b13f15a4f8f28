use console::{Style, StyledObject};
use dragon_core::mode::Mode;

/// Represents the type of a chat message, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMessageType {
    /// The prompt for user input.
    Prompt,
    /// A reply from the assistant.
    Assistant,
    /// Footer information, like status lines.
    Footer,
    /// An error message.
    Error,
}

/// Styles a string of text according to the specified `ChatMessageType`.
pub fn style_chat_text(text: &str, style: ChatMessageType) -> StyledObject<&str> {
    let style_obj = match style {
        ChatMessageType::Prompt => Style::new().blue().bold(),
        ChatMessageType::Assistant => Style::new(),
        ChatMessageType::Footer => Style::new().white().dim(),
        ChatMessageType::Error => Style::new().red().bold(),
    };
    style_obj.apply_to(text)
}

/// The status line shown above the input prompt.
pub fn format_prompt_meta(mode: Option<Mode>, memory: bool) -> String {
    let mode = mode.map(|m| m.label()).unwrap_or("Chat");
    if memory {
        format!("[mode: {mode} | memory]")
    } else {
        format!("[mode: {mode}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_styles() {
        let styled = style_chat_text("test", ChatMessageType::Error);
        assert_eq!(
            styled.force_styling(true).to_string(),
            "\u{1b}[31m\u{1b}[1mtest\u{1b}[0m"
        );
        let plain = style_chat_text("reply", ChatMessageType::Assistant);
        assert_eq!(plain.force_styling(true).to_string(), "reply");
    }

    #[test]
    fn test_format_prompt_meta() {
        assert_eq!(
            format_prompt_meta(Some(Mode::Study), false),
            "[mode: Study / Explain]"
        );
        assert_eq!(format_prompt_meta(None, true), "[mode: Chat | memory]");
    }
}
