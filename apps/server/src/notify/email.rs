//! Email delivery through an HTTP mail relay.
//!
//! The relay receives `POST {MAIL_API_URL}` with a bearer key and a JSON
//! message. The receipt travels as a link rather than an inline attachment.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use super::{Channel, Notice, Notifier, NotifyError};

#[derive(Debug, Clone)]
pub struct EmailNotifier {
    client: Client,
    api_url: Option<Url>,
    api_key: Option<String>,
    from: String,
    to: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MailMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<Attachment<'a>>,
}

#[derive(Serialize)]
struct Attachment<'a> {
    url: &'a str,
}

impl EmailNotifier {
    pub fn new(
        client: Client,
        api_url: Option<Url>,
        api_key: Option<String>,
        from: impl Into<String>,
        to: Option<String>,
    ) -> Self {
        EmailNotifier {
            client,
            api_url,
            api_key,
            from: from.into(),
            to,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some() && self.to.is_some()
    }

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let (Some(url), Some(key), Some(to)) = (&self.api_url, &self.api_key, &self.to) else {
            return Err(NotifyError::NotConfigured);
        };

        let message = MailMessage {
            from: &self.from,
            to,
            subject: &notice.subject,
            text: &notice.body,
            reply_to: notice.reply_to.as_deref(),
            attachments: notice
                .attachment_url
                .as_deref()
                .map(|url| vec![Attachment { url }])
                .unwrap_or_default(),
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
