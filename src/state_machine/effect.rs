//! Effects produced by state transitions

use crate::backend::ContactLead;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append the visitor's own message to the transcript
    AppendUserMessage { text: String },

    /// Append a system message (tone formatting happens at append time)
    AppendSystemMessage {
        content: String,
        options: Option<Vec<String>>,
    },

    /// The conversation was replaced with a fresh one
    ConversationReset,

    /// Look up free text in the owner's knowledge base
    QueryKnowledgeBase { query: String },

    /// Submit the collected lead
    CaptureContact { lead: ContactLead },
}

impl Effect {
    pub fn say(content: impl Into<String>) -> Self {
        Effect::AppendSystemMessage {
            content: content.into(),
            options: None,
        }
    }

    pub fn ask(content: impl Into<String>, options: &[&str]) -> Self {
        Effect::AppendSystemMessage {
            content: content.into(),
            options: Some(options.iter().map(|o| (*o).to_string()).collect()),
        }
    }
}
