//! Clients for the two external collaborators
//!
//! The widget never owns persistence. Free-form questions go to the owner's
//! knowledge base and finished leads go to contact capture.

mod contact;
mod error;
mod knowledge_base;

pub use contact::{ContactCaptureService, ContactLead};
pub use error::{BackendError, BackendErrorKind};
pub use knowledge_base::{KnowledgeBaseAnswer, KnowledgeBaseService};

use reqwest::StatusCode;

/// Map a non-success HTTP status to an error classification
pub(crate) fn classify_status(status: StatusCode, body: &str) -> BackendError {
    match status.as_u16() {
        400 | 422 => BackendError::invalid_request(format!("Rejected request: {body}")),
        500..=599 => BackendError::server_error(format!("Server error: {body}")),
        _ => BackendError::unknown(format!("HTTP {status}: {body}")),
    }
}

/// Map a reqwest send failure to an error classification
pub(crate) fn classify_send_error(e: &reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::network(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        BackendError::network(format!("Connection failed: {e}"))
    } else {
        BackendError::unknown(format!("Request failed: {e}"))
    }
}
