//! Contact-capture client

use super::{classify_send_error, classify_status, BackendError};
use crate::state_machine::state::{Flow, LeadFields};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Lead submitted at the end of a flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactLead {
    pub flow: Flow,
    pub location: Option<String>,
    pub property_type: Option<String>,
    pub budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation_time: Option<String>,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub contact_time: String,
    pub user_id: Option<String>,
}

impl ContactLead {
    pub fn from_fields(flow: Flow, fields: &LeadFields, owner_id: Option<String>) -> Self {
        Self {
            flow,
            location: fields.location.clone(),
            property_type: fields.property_type.clone(),
            budget: fields.budget.clone(),
            valuation_time: fields.valuation_time.clone(),
            email: fields.email.clone().unwrap_or_default(),
            phone: fields.phone.clone().unwrap_or_default(),
            name: fields.name.clone().unwrap_or_default(),
            contact_time: fields.contact_time.clone().unwrap_or_default(),
            user_id: owner_id,
        }
    }
}

/// HTTP client for the contact-capture endpoint
pub struct ContactCaptureService {
    client: Client,
    url: String,
}

impl ContactCaptureService {
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

    /// Any 2xx is success; the body is ignored
    pub async fn capture(&self, lead: &ContactLead) -> Result<(), BackendError> {
        if lead.email.trim().is_empty() || lead.phone.trim().is_empty() {
            return Err(BackendError::invalid_request(
                "Missing required contact details",
            ));
        }

        let response = self
            .client
            .post(&self.url)
            .json(lead)
            .send()
            .await
            .map_err(|e| classify_send_error(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, &body))
    }
}
