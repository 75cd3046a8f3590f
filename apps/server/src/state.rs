//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

use marquee_core::{RateLimitPolicy, RateLimiter};
use marquee_db::Database;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::notify::{Dispatcher, EmailNotifier, WhatsAppNotifier};

/// Timeout for outbound notification requests.
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Tracked keys above which expired entries are swept on the next check.
const LIMITER_PRUNE_THRESHOLD: usize = 1024;

/// State handed to every handler.
pub struct AppState {
    pub config: ServerConfig,
    pub db: Database,
    pub dispatcher: Dispatcher,
    limiter: Mutex<RateLimiter>,
}

impl AppState {
    /// Builds state with the email and WhatsApp notifiers from `config`.
    pub fn new(config: ServerConfig, db: Database) -> Result<Arc<Self>, reqwest::Error> {
        let client = Client::builder().timeout(NOTIFY_TIMEOUT).build()?;

        let dispatcher = Dispatcher::new(db.clone())
            .with_notifier(Arc::new(EmailNotifier::new(
                client.clone(),
                config.mail_api_url.clone(),
                config.mail_api_key.clone(),
                config.mail_from.clone(),
                config.admin_email.clone(),
            )))
            .with_notifier(Arc::new(WhatsAppNotifier::new(
                client,
                config.whatsapp_api_url.clone(),
                config.whatsapp_api_key.clone(),
                config.admin_whatsapp.clone(),
            )));

        Ok(Self::with_dispatcher(config, db, dispatcher))
    }

    pub fn with_dispatcher(config: ServerConfig, db: Database, dispatcher: Dispatcher) -> Arc<Self> {
        Arc::new(AppState {
            config,
            db,
            dispatcher,
            limiter: Mutex::new(RateLimiter::new()),
        })
    }

    pub fn rate_policy(&self) -> RateLimitPolicy {
        self.config.rate_limit
    }

    /// Counts one attempt against `key`.
    pub async fn check_rate(&self, key: &str) -> Result<(), ApiError> {
        let policy = self.rate_policy();
        let mut limiter = self.limiter.lock().await;

        if limiter.len() > LIMITER_PRUNE_THRESHOLD {
            let pruned = limiter.prune_expired(policy.window);
            debug!(pruned, "Pruned expired rate limit entries");
        }

        limiter.check(key, &policy)?;
        Ok(())
    }
}
