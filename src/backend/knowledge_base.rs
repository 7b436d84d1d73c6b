//! Knowledge-base query client

use super::{classify_send_error, classify_status, BackendError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wire request for `POST knowledge-base/query`
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    user_id: Option<&'a str>,
}

/// Wire response from the knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseAnswer {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub no_information: bool,
}

impl KnowledgeBaseAnswer {
    /// The usable answer, or `None` when the owner's documents don't cover it
    pub fn into_answer(self) -> Option<String> {
        if self.no_information || self.answer.trim().is_empty() {
            None
        } else {
            Some(self.answer)
        }
    }
}

/// HTTP client for the owner's knowledge base
pub struct KnowledgeBaseService {
    client: Client,
    url: String,
}

impl KnowledgeBaseService {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::unknown(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub async fn query(
        &self,
        query: &str,
        owner_id: Option<&str>,
    ) -> Result<KnowledgeBaseAnswer, BackendError> {
        let response = self
            .client
            .post(&self.url)
            .json(&QueryRequest {
                query,
                user_id: owner_id,
            })
            .send()
            .await
            .map_err(|e| classify_send_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| BackendError::decode(format!("Failed to parse response: {e} - body: {body}")))
    }
}
