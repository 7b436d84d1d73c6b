//! Conversation transcript and render model
//!
//! The transcript is append-only. What the visitor may do next is derived
//! entirely from the most recent message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat bubble
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub is_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(content: String, is_user: bool, options: Option<Vec<String>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content,
            is_user,
            options,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text.into(), true, None)
    }

    pub fn system(content: impl Into<String>, options: Option<Vec<String>>) -> Self {
        Self::new(content.into(), false, options)
    }

    /// Options that gate the next input, if any
    pub fn pending_options(&self) -> Option<&[String]> {
        self.options.as_deref().filter(|opts| !opts.is_empty())
    }
}

/// Ordered, append-only message log
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a reference to the stored copy
    pub fn append(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Quick replies the visitor must pick from, if the last message has any
    pub fn pending_options(&self) -> Option<&[String]> {
        self.messages.last().and_then(Message::pending_options)
    }

    /// Free-text entry is disabled while quick replies are pending
    pub fn input_disabled(&self) -> bool {
        self.pending_options().is_some()
    }

    /// Whether `input` is acceptable as the next submission
    pub fn accepts(&self, input: &str) -> bool {
        match self.pending_options() {
            Some(options) => options.iter().any(|o| o == input),
            None => true,
        }
    }
}
