//! Events that drive the conversation

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Visitor clicked a quick reply or typed text
    UserInput { text: String },

    /// Knowledge-base lookup finished; `None` means no usable answer
    KnowledgeBaseAnswered { answer: Option<String> },

    /// Contact-capture call finished
    ContactCaptureFinished { success: bool },
}

impl Event {
    pub fn user_input(text: impl Into<String>) -> Self {
        Event::UserInput { text: text.into() }
    }
}
