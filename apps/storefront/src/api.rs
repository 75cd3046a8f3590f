//! # Order API Client
//!
//! The storefront's view of apps/server.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderApi method        HTTP                                            │
//! │  ─────────────────────  ────────────────────────────────────────────    │
//! │  submit_payment       ► POST /api/payments/submit-manual  (multipart)   │
//! │  submit_contact       ► POST /api/contact/submit          (JSON)        │
//! │  subscribe_newsletter ► POST /api/newsletter/subscribe    (JSON)        │
//! │  fetch_ticket_price   ► GET  /api/pricing/ticket-price                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Error bodies (`{"error": "..."}`) become [`ClientError::Rejected`] with the
//! server's text. Anything else that is not a success becomes
//! [`ClientError::Unavailable`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use marquee_core::{ContactMessage, LineItem, Money};

use crate::config::StorefrontConfig;
use crate::error::{ClientError, StorefrontError};

/// A receipt file ready to upload.
#[derive(Debug, Clone)]
pub struct ReceiptUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Everything the payment endpoint needs.
#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    pub items: Vec<LineItem>,
    pub grand_total: Money,
    pub summary: String,
    pub receipt: ReceiptUpload,
}

/// Server acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub message: String,
    /// Ledger reference for payments.
    pub reference: Option<String>,
}

#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn submit_payment(&self, submission: PaymentSubmission)
        -> Result<Acknowledgement, ClientError>;

    async fn submit_contact(&self, message: &ContactMessage) -> Result<Acknowledgement, ClientError>;

    async fn subscribe_newsletter(&self, email: &str) -> Result<Acknowledgement, ClientError>;

    /// Raw `price` value; the caller decides whether to accept it.
    async fn fetch_ticket_price(&self) -> Result<Value, ClientError>;
}

/// reqwest-backed [`OrderApi`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &StorefrontConfig) -> Result<Self, StorefrontError> {
        let base = Url::parse(&config.api_base_url)
            .map_err(|e| StorefrontError::Config(format!("Invalid API URL: {e}")))?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| StorefrontError::Config(format!("HTTP client: {e}")))?;
        Ok(ApiClient { client, base })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }
}

/// Turns a response into an acknowledgement or the matching error.
async fn acknowledge(response: Response) -> Result<Acknowledgement, ClientError> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(Acknowledgement {
            message: body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            reference: body
                .get("reference")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }

    match body.get("error").and_then(Value::as_str) {
        Some(message) => {
            warn!(status = status.as_u16(), message, "Server rejected request");
            Err(ClientError::Rejected {
                status: status.as_u16(),
                message: message.to_string(),
            })
        }
        None => {
            warn!(status = status.as_u16(), "Server failed without an error body");
            Err(ClientError::Unavailable {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl OrderApi for ApiClient {
    async fn submit_payment(
        &self,
        submission: PaymentSubmission,
    ) -> Result<Acknowledgement, ClientError> {
        debug!(
            items = submission.items.len(),
            total = %submission.grand_total,
            "Submitting payment"
        );

        let order_details = serde_json::to_string(&submission.items)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        let receipt = Part::bytes(submission.receipt.bytes)
            .file_name(submission.receipt.file_name)
            .mime_str(&submission.receipt.content_type)?;

        let form = Form::new()
            .part("receipt", receipt)
            .text("orderDetails", order_details)
            .text("grandTotal", submission.grand_total.to_major_string())
            .text("summary", submission.summary);

        let response = self
            .client
            .post(self.endpoint("/api/payments/submit-manual"))
            .multipart(form)
            .send()
            .await?;
        acknowledge(response).await
    }

    async fn submit_contact(&self, message: &ContactMessage) -> Result<Acknowledgement, ClientError> {
        let response = self
            .client
            .post(self.endpoint("/api/contact/submit"))
            .json(message)
            .send()
            .await?;
        acknowledge(response).await
    }

    async fn subscribe_newsletter(&self, email: &str) -> Result<Acknowledgement, ClientError> {
        let response = self
            .client
            .post(self.endpoint("/api/newsletter/subscribe"))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        acknowledge(response).await
    }

    async fn fetch_ticket_price(&self) -> Result<Value, ClientError> {
        let response = self
            .client
            .get(self.endpoint("/api/pricing/ticket-price"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Unavailable {
                status: status.as_u16(),
            });
        }
        let body: Value = response.json().await?;
        Ok(body.get("price").cloned().unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = StorefrontConfig {
            api_base_url: "https://tickets.example.com/".into(),
            ..StorefrontConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("/api/contact/submit"),
            "https://tickets.example.com/api/contact/submit"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let config = StorefrontConfig {
            api_base_url: "http://127.0.0.1:9".into(),
            request_timeout_secs: 2,
            ..StorefrontConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();

        let err = client.subscribe_newsletter("a@b.co").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
