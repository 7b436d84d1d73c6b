//! Trait abstractions for runtime I/O
//!
//! These traits let the widget runtime be tested with mock collaborators.

use crate::backend::{BackendError, ContactCaptureService, ContactLead, KnowledgeBaseService};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Free-form question answering scoped to one owner
#[async_trait]
pub trait KnowledgeBaseClient: Send + Sync {
    /// Answer for `query`, or `None` when nothing relevant is known.
    /// Transport failures are reported as `None` too.
    async fn query(&self, query: &str, owner_id: Option<&str>) -> Option<String>;
}

/// Sink for finished leads
#[async_trait]
pub trait ContactCaptureClient: Send + Sync {
    async fn capture(&self, lead: &ContactLead) -> Result<(), BackendError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: KnowledgeBaseClient + ?Sized> KnowledgeBaseClient for Arc<T> {
    async fn query(&self, query: &str, owner_id: Option<&str>) -> Option<String> {
        (**self).query(query, owner_id).await
    }
}

#[async_trait]
impl<T: ContactCaptureClient + ?Sized> ContactCaptureClient for Arc<T> {
    async fn capture(&self, lead: &ContactLead) -> Result<(), BackendError> {
        (**self).capture(lead).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl KnowledgeBaseClient for KnowledgeBaseService {
    async fn query(&self, query: &str, owner_id: Option<&str>) -> Option<String> {
        let start = Instant::now();
        let result = KnowledgeBaseService::query(self, query, owner_id).await;
        let duration = start.elapsed();

        match result {
            Ok(answer) => {
                let answer = answer.into_answer();
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    answered = answer.is_some(),
                    "Knowledge base query completed"
                );
                answer
            }
            Err(e) => {
                tracing::warn!(
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Knowledge base query failed, treating as no information"
                );
                None
            }
        }
    }
}

#[async_trait]
impl ContactCaptureClient for ContactCaptureService {
    async fn capture(&self, lead: &ContactLead) -> Result<(), BackendError> {
        let start = Instant::now();
        let result = ContactCaptureService::capture(self, lead).await;
        let duration = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(
                duration_ms = %duration.as_millis(),
                flow = %lead.flow,
                "Contact captured"
            ),
            Err(e) => tracing::warn!(
                duration_ms = %duration.as_millis(),
                flow = %lead.flow,
                error = %e.message,
                kind = e.kind.as_str(),
                "Contact capture failed"
            ),
        }

        result
    }
}
