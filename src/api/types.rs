//! API request and response types

use crate::runtime::WidgetSnapshot;
use serde::{Deserialize, Serialize};

/// Visitor input, either a clicked option or typed text
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

/// Response carrying the widget as it stands after an action
#[derive(Debug, Serialize)]
pub struct WidgetResponse {
    pub widget: WidgetSnapshot,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Quick replies the visitor must choose from, when that was the problem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            options: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }
}
