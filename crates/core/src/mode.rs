//! Task modes and their instruction templates.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported task modes (serialized as lowercase strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Summarize,
    Paraphrase,
    Essay,
    Study,
    Outline,
    Quiz,
    Flashcards,
    Improve,
    Research,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unknown mode: {0}")]
pub struct UnknownMode(pub String);

impl Mode {
    pub const ALL: [Mode; 9] = [
        Mode::Summarize,
        Mode::Paraphrase,
        Mode::Essay,
        Mode::Study,
        Mode::Outline,
        Mode::Quiz,
        Mode::Flashcards,
        Mode::Improve,
        Mode::Research,
    ];

    pub fn as_str(&self) -> &'static str {
        match &self {
            Mode::Summarize => "summarize",
            Mode::Paraphrase => "paraphrase",
            Mode::Essay => "essay",
            Mode::Study => "study",
            Mode::Outline => "outline",
            Mode::Quiz => "quiz",
            Mode::Flashcards => "flashcards",
            Mode::Improve => "improve",
            Mode::Research => "research",
        }
    }

    pub fn label(&self) -> &'static str {
        match &self {
            Mode::Summarize => "Summarize",
            Mode::Paraphrase => "Paraphrase",
            Mode::Essay => "Essay",
            Mode::Study => "Study / Explain",
            Mode::Outline => "Outline",
            Mode::Quiz => "Quiz",
            Mode::Flashcards => "Flashcards",
            Mode::Improve => "Improve Writing",
            Mode::Research => "Research Style",
        }
    }

    /// Fixed instruction phrase placed before the user's text.
    pub fn instruction(&self) -> &'static str {
        match &self {
            Mode::Summarize => {
                "Summarize the following text clearly and concisely using academic language:"
            }
            Mode::Paraphrase => {
                "Paraphrase the following text in your own words while preserving its original meaning:"
            }
            Mode::Essay => {
                "Write a well-structured academic essay with an introduction, body paragraphs and a conclusion on the following topic:"
            }
            Mode::Study => {
                "Explain the following concept step by step so that a student can understand it, using simple examples:"
            }
            Mode::Outline => {
                "Create a clear, hierarchical outline with headings and bullet points for the following topic:"
            }
            Mode::Quiz => {
                "Create a short multiple-choice quiz with an answer key based on the following material:"
            }
            Mode::Flashcards => {
                "Create study flashcards in a question and answer format from the following material:"
            }
            Mode::Improve => {
                "Improve the grammar, clarity and flow of the following writing without changing its meaning:"
            }
            Mode::Research => {
                "Respond in a formal research style with structured sections and an objective tone to the following:"
            }
        }
    }

    /// Wraps `input` in this mode's instruction template.
    pub fn apply(&self, input: &str) -> String {
        format!("{}\n\n{}", self.instruction(), input)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}
