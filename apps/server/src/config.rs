//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.
//!
//! ## Environment Variables
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │ Variable                     │ Default                                  │
//! ├──────────────────────────────┼──────────────────────────────────────────┤
//! │ MARQUEE_BIND_ADDR            │ 0.0.0.0                                  │
//! │ MARQUEE_PORT                 │ 3001                                     │
//! │ MARQUEE_DB_PATH              │ marquee.db                               │
//! │ MARQUEE_RECEIPTS_DIR         │ receipts                                 │
//! │ MARQUEE_PUBLIC_BASE_URL      │ http://localhost:3001                    │
//! │ MARQUEE_TICKET_PRICE         │ 6499 (major units)                       │
//! │ MARQUEE_BRAND                │ Marquee                                  │
//! │ MARQUEE_MAX_BODY_BYTES       │ 6291456 (6 MiB)                          │
//! │ MARQUEE_RATE_LIMIT_ATTEMPTS  │ 3                                        │
//! │ MARQUEE_RATE_LIMIT_WINDOW_SECS│ 60                                      │
//! │ MARQUEE_TRUST_PROXY          │ false                                    │
//! │ MARQUEE_BANK_NAME / _ACCOUNT_NAME / _ACCOUNT_NUMBER                     │
//! │ ADMIN_EMAIL, ADMIN_WHATSAPP  │ unset (channel skipped)                  │
//! │ MAIL_API_URL, MAIL_API_KEY   │ unset (email skipped)                    │
//! │ MAIL_FROM                    │ no-reply@marquee.local                   │
//! │ WHATSAPP_API_URL, _API_KEY   │ unset (WhatsApp skipped)                 │
//! └──────────────────────────────┴──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use marquee_core::pricing::DEFAULT_TICKET_PRICE;
use marquee_core::summary::BankDetails;
use marquee_core::{Money, RateLimitPolicy};
use url::Url;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database_path: PathBuf,

    /// Where uploaded receipts are written.
    pub receipts_dir: PathBuf,

    /// Externally reachable base URL, used to link stored receipts.
    pub public_base_url: String,

    /// Price answered by `GET /api/pricing/ticket-price`.
    pub ticket_price: Money,

    /// Brand name printed in notification summaries.
    pub brand: String,

    pub bank: BankDetails,

    /// Request body cap. Must fit a 5 MiB receipt plus the form fields.
    pub max_body_bytes: usize,

    /// Applied per client IP to payment and contact submissions.
    pub rate_limit: RateLimitPolicy,

    /// Take the client IP from `X-Forwarded-For` (only behind a proxy).
    pub trust_proxy: bool,

    pub admin_email: Option<String>,
    pub admin_whatsapp: Option<String>,

    pub mail_api_url: Option<Url>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,

    pub whatsapp_api_url: Option<Url>,
    pub whatsapp_api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 3001,
            database_path: PathBuf::from("marquee.db"),
            receipts_dir: PathBuf::from("receipts"),
            public_base_url: "http://localhost:3001".to_string(),
            ticket_price: DEFAULT_TICKET_PRICE,
            brand: "Marquee".to_string(),
            bank: BankDetails {
                bank_name: "Access Bank".to_string(),
                account_name: "Marquee Events Limited".to_string(),
                account_number: "0123456789".to_string(),
            },
            max_body_bytes: 6 * 1024 * 1024,
            rate_limit: RateLimitPolicy::default(),
            trust_proxy: false,
            admin_email: None,
            admin_whatsapp: None,
            mail_api_url: None,
            mail_api_key: None,
            mail_from: "no-reply@marquee.local".to_string(),
            whatsapp_api_url: None,
            whatsapp_api_key: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn load_from<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = ServerConfig::default();

        if let Some(addr) = var("MARQUEE_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(port) = var("MARQUEE_PORT") {
            config.port = parse(&port, "MARQUEE_PORT")?;
        }
        if let Some(path) = var("MARQUEE_DB_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(dir) = var("MARQUEE_RECEIPTS_DIR") {
            config.receipts_dir = PathBuf::from(dir);
        }
        if let Some(url) = var("MARQUEE_PUBLIC_BASE_URL") {
            config.public_base_url = parse_url(&url, "MARQUEE_PUBLIC_BASE_URL")?.to_string();
        }
        if let Some(price) = var("MARQUEE_TICKET_PRICE") {
            config.ticket_price = Money::parse_major(&price)
                .filter(Money::is_positive)
                .ok_or_else(|| ConfigError::InvalidValue("MARQUEE_TICKET_PRICE".to_string()))?;
        }
        if let Some(brand) = var("MARQUEE_BRAND") {
            config.brand = brand;
        }
        if let Some(bytes) = var("MARQUEE_MAX_BODY_BYTES") {
            config.max_body_bytes = parse(&bytes, "MARQUEE_MAX_BODY_BYTES")?;
        }
        if let Some(attempts) = var("MARQUEE_RATE_LIMIT_ATTEMPTS") {
            config.rate_limit.max_attempts = parse(&attempts, "MARQUEE_RATE_LIMIT_ATTEMPTS")?;
        }
        if let Some(secs) = var("MARQUEE_RATE_LIMIT_WINDOW_SECS") {
            config.rate_limit.window =
                Duration::from_secs(parse(&secs, "MARQUEE_RATE_LIMIT_WINDOW_SECS")?);
        }
        if let Some(trust) = var("MARQUEE_TRUST_PROXY") {
            config.trust_proxy = parse(&trust, "MARQUEE_TRUST_PROXY")?;
        }

        if let Some(name) = var("MARQUEE_BANK_NAME") {
            config.bank.bank_name = name;
        }
        if let Some(name) = var("MARQUEE_BANK_ACCOUNT_NAME") {
            config.bank.account_name = name;
        }
        if let Some(number) = var("MARQUEE_BANK_ACCOUNT_NUMBER") {
            config.bank.account_number = number;
        }

        config.admin_email = var("ADMIN_EMAIL");
        config.admin_whatsapp = var("ADMIN_WHATSAPP");

        config.mail_api_url = var("MAIL_API_URL")
            .map(|url| parse_url(&url, "MAIL_API_URL"))
            .transpose()?;
        config.mail_api_key = var("MAIL_API_KEY");
        if let Some(from) = var("MAIL_FROM") {
            config.mail_from = from;
        }

        config.whatsapp_api_url = var("WHATSAPP_API_URL")
            .map(|url| parse_url(&url, "WHATSAPP_API_URL"))
            .transpose()?;
        config.whatsapp_api_key = var("WHATSAPP_API_KEY");

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let receipt_with_fields = marquee_core::validation::MAX_RECEIPT_BYTES as usize + 64 * 1024;
        if self.max_body_bytes < receipt_with_fields {
            return Err(ConfigError::InvalidValue(format!(
                "MARQUEE_MAX_BODY_BYTES must be at least {receipt_with_fields}"
            )));
        }
        if self.rate_limit.window.is_zero() {
            return Err(ConfigError::InvalidValue(
                "MARQUEE_RATE_LIMIT_WINDOW_SECS".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

fn parse_url(value: &str, key: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            key: key.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid URL in {key}: {reason}")]
    InvalidUrl { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::load_from(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.ticket_price, DEFAULT_TICKET_PRICE);
        assert_eq!(config.rate_limit, RateLimitPolicy::default());
        assert!(config.admin_email.is_none());
        assert!(config.mail_api_url.is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MARQUEE_PORT", "8080"),
            ("MARQUEE_TICKET_PRICE", "7500.50"),
            ("MARQUEE_RATE_LIMIT_ATTEMPTS", "5"),
            ("ADMIN_EMAIL", "box@marquee.test"),
            ("MAIL_API_URL", "https://mail.example.com/send"),
            ("WHATSAPP_API_KEY", "  "),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.ticket_price, Money::from_minor(750_050));
        assert_eq!(config.rate_limit.max_attempts, 5);
        assert_eq!(config.admin_email.as_deref(), Some("box@marquee.test"));
        assert_eq!(
            config.mail_api_url.as_ref().map(Url::as_str),
            Some("https://mail.example.com/send")
        );
        assert!(config.whatsapp_api_key.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("MARQUEE_PORT", "http")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(load(&[("MARQUEE_TICKET_PRICE", "0")]).is_err());
        assert!(load(&[("MARQUEE_TICKET_PRICE", "-5")]).is_err());
        assert!(matches!(
            load(&[("MAIL_API_URL", "ftp://mail")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(load(&[("MARQUEE_MAX_BODY_BYTES", "1024")]).is_err());
        assert!(load(&[("MARQUEE_RATE_LIMIT_WINDOW_SECS", "0")]).is_err());
    }
}
