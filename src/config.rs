//! Server and widget configuration

use crate::tone::Tone;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_KNOWLEDGE_BASE_URL: &str = "http://localhost:3000/api/knowledge-base/query";
const DEFAULT_CONTACT_CAPTURE_URL: &str = "http://localhost:3000/api/store-contact";
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

/// Per-widget settings supplied by the host page. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub predefined_questions: Vec<String>,
    /// Tenant that owns the knowledge base and receives leads
    #[serde(default)]
    pub owner_id: Option<String>,
}

impl WidgetConfig {
    /// Drop blank quick questions; they would render as empty buttons
    pub fn normalized(mut self) -> Self {
        self.predefined_questions
            .retain(|q| !q.trim().is_empty());
        self
    }
}

/// Process-level configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub knowledge_base_url: String,
    pub contact_capture_url: String,
    pub backend_timeout: Duration,
    /// Widgets with no activity for this long are unmounted
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            knowledge_base_url: DEFAULT_KNOWLEDGE_BASE_URL.to_string(),
            contact_capture_url: DEFAULT_CONTACT_CAPTURE_URL.to_string(),
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("LEAD_WIDGET_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            knowledge_base_url: lookup("KNOWLEDGE_BASE_URL")
                .unwrap_or(defaults.knowledge_base_url),
            contact_capture_url: lookup("CONTACT_CAPTURE_URL")
                .unwrap_or(defaults.contact_capture_url),
            backend_timeout: lookup("BACKEND_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.backend_timeout, Duration::from_secs),
            idle_timeout: lookup("WIDGET_IDLE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(defaults.idle_timeout, Duration::from_secs),
        }
    }
}
