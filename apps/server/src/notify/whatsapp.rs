//! WhatsApp delivery through a messaging gateway.
//!
//! `POST {WHATSAPP_API_URL}` with `{to, message, mediaUrl?}` and a bearer key.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use super::{Channel, Notice, Notifier, NotifyError};

#[derive(Debug, Clone)]
pub struct WhatsAppNotifier {
    client: Client,
    api_url: Option<Url>,
    api_key: Option<String>,
    to: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GatewayMessage<'a> {
    to: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_url: Option<&'a str>,
}

impl WhatsAppNotifier {
    pub fn new(
        client: Client,
        api_url: Option<Url>,
        api_key: Option<String>,
        to: Option<String>,
    ) -> Self {
        WhatsAppNotifier {
            client,
            api_url,
            api_key,
            to,
        }
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    fn channel(&self) -> Channel {
        Channel::WhatsApp
    }

    fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some() && self.to.is_some()
    }

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let (Some(url), Some(key), Some(to)) = (&self.api_url, &self.api_key, &self.to) else {
            return Err(NotifyError::NotConfigured);
        };

        // Chat messages have no subject line.
        let message = GatewayMessage {
            to,
            message: format!("*{}*\n\n{}", notice.subject, notice.body),
            media_url: notice.attachment_url.as_deref(),
        };

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(key)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
