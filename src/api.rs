//! HTTP API for hosting lead widgets
//!
//! A host page mounts a widget, streams its transcript and posts visitor
//! input on its behalf.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::backend::{BackendError, ContactCaptureService, KnowledgeBaseService};
use crate::config::ServerConfig;
use crate::runtime::ProductionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub widgets: Arc<ProductionManager>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self, BackendError> {
        let knowledge_base =
            KnowledgeBaseService::new(&config.knowledge_base_url, config.backend_timeout)?;
        let contact_capture =
            ContactCaptureService::new(&config.contact_capture_url, config.backend_timeout)?;

        Ok(Self {
            widgets: Arc::new(
                ProductionManager::new(knowledge_base, contact_capture)
                    .with_idle_timeout(config.idle_timeout),
            ),
        })
    }
}
