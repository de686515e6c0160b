//! Order-intake client.
//!
//! Posts order payloads and contact messages as JSON and interprets the
//! structured reply. There are no retries; every failure is reported to the
//! caller, which keeps its form for another attempt.

use medina_core::{ContactMessage, OrderPayload, SubmissionReply};
use serde::Serialize;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::OrderConfig;

/// Field carrying the access key in the posted JSON.
const ACCESS_KEY_FIELD: &str = "access_key";

/// Errors that can occur when submitting an order.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Request never got an answer.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("Order endpoint returned HTTP {status}")]
    Status { status: u16, body: String },

    /// Endpoint understood the order and refused it.
    #[error("Order rejected: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),

    /// Endpoint answered with something that is not a submission reply.
    #[error("Malformed reply: {0}")]
    Malformed(String),

    /// Payload could not be encoded.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What the endpoint said about an accepted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub message: Option<String>,
}

/// Client for the order-intake endpoint.
#[derive(Clone)]
pub struct OrderClient {
    client: reqwest::Client,
    endpoint: Url,
    access_key: SecretString,
}

impl OrderClient {
    /// Create a new order client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &OrderConfig) -> Result<Self, SubmitError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            endpoint: config.endpoint.clone(),
            access_key: config.access_key.clone(),
        })
    }

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Rejected`] when the endpoint refuses the order,
    /// and the other variants for transport and protocol failures.
    #[instrument(skip_all, fields(reference = %payload.reference))]
    pub async fn submit(&self, payload: &OrderPayload) -> Result<OrderReceipt, SubmitError> {
        let receipt = self.deliver(payload).await?;
        info!("Order accepted");
        Ok(receipt)
    }

    /// Send a contact message to the same endpoint.
    ///
    /// # Errors
    ///
    /// Same as [`Self::submit`].
    #[instrument(skip_all)]
    pub async fn send_contact(
        &self,
        message: &ContactMessage,
    ) -> Result<OrderReceipt, SubmitError> {
        let receipt = self.deliver(message).await?;
        info!("Contact message accepted");
        Ok(receipt)
    }

    async fn deliver<T>(&self, payload: &T) -> Result<OrderReceipt, SubmitError>
    where
        T: Serialize + Sync,
    {
        let mut body = serde_json::to_value(payload)?;
        if let Value::Object(fields) = &mut body {
            fields.insert(
                ACCESS_KEY_FIELD.to_owned(),
                Value::String(self.access_key.expose_secret().to_owned()),
            );
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = %status, "Intake endpoint returned non-success status");
            return Err(SubmitError::Status {
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }

        let reply: SubmissionReply =
            serde_json::from_str(&text).map_err(|e| SubmitError::Malformed(e.to_string()))?;

        if reply.success {
            Ok(OrderReceipt {
                message: reply.message,
            })
        } else {
            warn!(message = ?reply.message, "Submission rejected by endpoint");
            Err(SubmitError::Rejected(reply.message))
        }
    }
}

impl std::fmt::Debug for OrderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
