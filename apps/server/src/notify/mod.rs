//! # Admin Notifications
//!
//! Fan-out of accepted submissions to the box office.
//!
//! ## Delivery Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handler ──► Dispatcher::dispatch(notice, channels)                     │
//! │                    │                                                    │
//! │        ┌───────────┴───────────┐   one spawned task per channel         │
//! │        ▼                       ▼                                        │
//! │   EmailNotifier          WhatsAppNotifier                               │
//! │        │                       │                                        │
//! │        └──── on success ───────┴──► payments.mark_notified(id)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Delivery is best effort. The HTTP response never waits on a channel and a
//! failing channel never affects the other one. Unconfigured channels are
//! skipped with a warning.

pub mod email;
pub mod whatsapp;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use marquee_db::Database;

pub use email::EmailNotifier;
pub use whatsapp::WhatsAppNotifier;

/// Delivery channel a notifier speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    WhatsApp,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::WhatsApp => "whatsapp",
        }
    }
}

/// A message for the box office.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub subject: String,
    pub body: String,
    /// Public link to an uploaded receipt.
    pub attachment_url: Option<String>,
    /// Address replies should go to, when the sender gave one.
    pub reply_to: Option<String>,
    /// Ledger row to stamp as notified after a successful delivery.
    pub payment_id: Option<String>,
}

impl Notice {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Notice {
            subject: subject.into(),
            body: body.into(),
            attachment_url: None,
            reply_to: None,
            payment_id: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Channel not configured")]
    NotConfigured,
}

/// One outbound delivery channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> Channel;

    /// Whether credentials and a recipient are present.
    fn is_configured(&self) -> bool;

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Spawns deliveries onto the runtime.
#[derive(Clone)]
pub struct Dispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
    db: Database,
}

impl Dispatcher {
    pub fn new(db: Database) -> Self {
        Dispatcher {
            notifiers: Vec::new(),
            db,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Sends `notice` on every notifier whose channel is listed.
    ///
    /// Returns the spawned tasks. Callers may drop them.
    pub fn dispatch(&self, notice: Notice, channels: &[Channel]) -> Vec<JoinHandle<()>> {
        let notice = Arc::new(notice);
        let mut handles = Vec::new();

        for notifier in &self.notifiers {
            let channel = notifier.channel();
            if !channels.contains(&channel) {
                continue;
            }
            if !notifier.is_configured() {
                warn!(channel = channel.as_str(), "Notifier not configured, skipping");
                continue;
            }

            let notifier = Arc::clone(notifier);
            let notice = Arc::clone(&notice);
            let db = self.db.clone();

            handles.push(tokio::spawn(async move {
                match notifier.send(&notice).await {
                    Ok(()) => {
                        info!(channel = channel.as_str(), subject = %notice.subject, "Notification sent");
                        if let Some(id) = &notice.payment_id {
                            if let Err(e) = db.payments().mark_notified(id).await {
                                warn!(payment_id = %id, error = %e, "Could not mark payment notified");
                            }
                        }
                    }
                    Err(e) => {
                        warn!(channel = channel.as_str(), error = %e, "Notification failed");
                    }
                }
            }));
        }

        debug!(spawned = handles.len(), "Dispatched notice");
        handles
    }
}
