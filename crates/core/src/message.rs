use serde::{Deserialize, Serialize};

/// Author of a message in a conversation or provider request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl From<Role> for String {
    fn from(val: Role) -> Self {
        val.as_str().into()
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match &self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Label used when a transcript is flattened into plain text.
    pub fn label(&self) -> &'static str {
        match &self {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Flattens a transcript into `Label: content` blocks separated by blank lines.
pub fn format_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.label(), m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(String::from(Role::User), "user");
    }

    #[test]
    fn test_message_serializes_to_role_and_content() {
        let value = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "hi"}));

        let parsed: Message =
            serde_json::from_value(json!({"role": "user", "content": "hello"})).unwrap();
        assert_eq!(parsed, Message::user("hello"));
    }

    #[test]
    fn test_message_rejects_unknown_role() {
        let parsed = serde_json::from_value::<Message>(json!({"role": "tool", "content": "x"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_format_transcript() {
        let transcript = format_transcript(&[
            Message::user("What is a cell?"),
            Message::assistant("The basic unit of life."),
        ]);
        assert_eq!(
            transcript,
            "User: What is a cell?\n\nAssistant: The basic unit of life."
        );
        assert_eq!(format_transcript(&[]), "");
    }
}
