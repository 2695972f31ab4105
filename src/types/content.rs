use serde::{Deserialize, Serialize};

/// Role type for a conversation message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role.
    User,

    /// Model role.
    Model,
}

/// One part of a message. The Gemini wire format allows several parts per
/// message; text parts are the only kind this client produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    /// The text of this part.
    pub text: String,
}

impl Part {
    /// Create a new text part.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A single message in a conversation transcript, in the shape the
/// `generateContent` endpoint expects: a role plus an ordered parts array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// The role of the message.
    pub role: Role,

    /// The ordered parts of the message.
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a new `Content` with the given role and a single text part.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::new(text)],
        }
    }

    /// Create a new user message with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a new model message with a single text part.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Concatenated text of all parts.
    pub fn text(&self) -> String {
        self.parts.iter().map(|part| part.text.as_str()).collect()
    }
}
