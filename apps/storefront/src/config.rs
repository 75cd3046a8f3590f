//! # Storefront Configuration
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`MARQUEE_*`)
//! 2. Config file (`storefront.toml` in the platform config dir, or `--config`)
//! 3. Defaults (this file)
//!
//! ```toml
//! api_base_url = "https://tickets.example.com"
//! brand = "Marquee"
//! request_timeout_secs = 30
//!
//! [bank]
//! bankName = "Access Bank"
//! accountName = "Marquee Events Limited"
//! accountNumber = "0123456789"
//!
//! [rate_limit]
//! max_attempts = 3
//! window_secs = 60
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use marquee_core::summary::BankDetails;
use marquee_core::RateLimitPolicy;

use crate::error::{StorefrontError, StorefrontResult};

/// Attempts per window for each rate-limited form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitSettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_window_secs() -> u64 {
    60
}

impl Default for LimitSettings {
    fn default() -> Self {
        LimitSettings {
            max_attempts: default_max_attempts(),
            window_secs: default_window_secs(),
        }
    }
}

impl LimitSettings {
    pub fn policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(self.max_attempts, Duration::from_secs(self.window_secs))
    }
}

/// Storefront configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Base URL of apps/server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Brand name printed in the order summary.
    #[serde(default = "default_brand")]
    pub brand: String,

    /// Where the cart file lives. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_bank")]
    pub bank: BankDetails,

    #[serde(default)]
    pub rate_limit: LimitSettings,
}

fn default_api_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_brand() -> String {
    "Marquee".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_bank() -> BankDetails {
    BankDetails {
        bank_name: "Access Bank".to_string(),
        account_name: "Marquee Events Limited".to_string(),
        account_number: "0123456789".to_string(),
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        StorefrontConfig {
            api_base_url: default_api_base_url(),
            brand: default_brand(),
            data_dir: None,
            request_timeout_secs: default_timeout(),
            bank: default_bank(),
            rate_limit: LimitSettings::default(),
        }
    }
}

impl StorefrontConfig {
    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads configuration: defaults, then the TOML file, then environment.
    pub fn load(config_path: Option<PathBuf>) -> StorefrontResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to `config_path` or the default location.
    pub fn save(&self, config_path: Option<PathBuf>) -> StorefrontResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StorefrontError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Applies `MARQUEE_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MARQUEE_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api_base_url = url;
        }
        if let Some(brand) = lookup("MARQUEE_BRAND") {
            self.brand = brand;
        }
        if let Some(dir) = lookup("MARQUEE_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = lookup("MARQUEE_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = secs;
        }
        if let Some(name) = lookup("MARQUEE_BANK_NAME") {
            self.bank.bank_name = name;
        }
        if let Some(name) = lookup("MARQUEE_BANK_ACCOUNT_NAME") {
            self.bank.account_name = name;
        }
        if let Some(number) = lookup("MARQUEE_BANK_ACCOUNT_NUMBER") {
            self.bank.account_number = number;
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StorefrontResult<()> {
        let url = Url::parse(&self.api_base_url).map_err(|e| {
            StorefrontError::Config(format!("Invalid API URL '{}': {e}", self.api_base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StorefrontError::Config(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api_base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(StorefrontError::Config(
                "request_timeout_secs must be positive".into(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(StorefrontError::Config(
                "rate_limit.window_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    // =========================================================================
    // Paths
    // =========================================================================

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "marquee", "storefront")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("storefront.toml"))
    }

    /// Directory holding the cart file.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(".marquee"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
