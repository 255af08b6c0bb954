//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field falls back to a sensible default, so a partial file (or an
//! empty one) yields a working iPhone-flipping setup. Telegram credentials
//! are referenced by env-var name in the config and resolved at startup.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

use crate::types::FlipError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub search: SearchConfig,
    pub pricing: PricingConfig,
    pub storage: StorageConfig,
    pub alerts: AlertsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    pub name: String,
    pub scan_interval_secs: u64,
    /// Send a heartbeat every N scans.
    pub heartbeat_every: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            name: "FLIPWATCH-001".to_string(),
            scan_interval_secs: 300,
            heartbeat_every: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub urls: Vec<String>,
    /// Prefix for relative listing hrefs.
    pub base_url: String,
    /// Path fragment that marks a listing-detail URL.
    pub listing_path: String,
    pub product_keyword: String,
    /// Model label used when no model name can be extracted.
    pub model_fallback: String,
    pub max_price: i64,
    pub block_keywords: Vec<String>,
    pub user_agent: String,
    pub accept_language: String,
    pub fetch_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            urls: vec!["https://www.facebook.com/marketplace/search/?query=iphone".to_string()],
            base_url: "https://facebook.com".to_string(),
            listing_path: "/marketplace/item/".to_string(),
            product_keyword: "iphone".to_string(),
            model_fallback: "iPhone".to_string(),
            max_price: 200,
            block_keywords: [
                "icloud",
                "activation lock",
                "google locked",
                "mdm",
                "financed",
                "stolen",
                "scam",
                "parts only",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            user_agent: "Mozilla/5.0 (Linux; Android 10)".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            fetch_timeout_secs: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PricingConfig {
    pub default_resale: i64,
    /// Profit at or above this is graded GOOD.
    pub profit_green: i64,
    /// Profit at or above this (but below green) is graded OK.
    pub profit_yellow: i64,
    /// Defect keyword → repair surcharge.
    pub repair_costs: HashMap<String, i64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_resale: 250,
            profit_green: 80,
            profit_yellow: 30,
            repair_costs: [
                ("cracked", 35),
                ("screen", 35),
                ("lcd", 35),
                ("battery", 20),
                ("back glass", 40),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub seen_file: String,
    pub ledger_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            seen_file: "seen.json".to_string(),
            ledger_file: "deals.csv".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlertsConfig {
    pub telegram_bot_token_env: String,
    pub telegram_chat_id_env: String,
    pub timeout_secs: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            telegram_chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Resolved Telegram bot credentials.
#[derive(Debug)]
pub struct TelegramCredentials {
    pub bot_token: SecretString,
    pub chat_id: String,
}

impl AlertsConfig {
    /// Resolve the bot token and chat id from the environment.
    ///
    /// Both are required: the monitor refuses to start without them.
    pub fn resolve_credentials(&self) -> Result<TelegramCredentials> {
        let bot_token = AppConfig::resolve_env(&self.telegram_bot_token_env)?;
        let chat_id = AppConfig::resolve_env(&self.telegram_chat_id_env)?;
        Ok(TelegramCredentials {
            bot_token: SecretString::new(bot_token),
            chat_id,
        })
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the scan loop cannot run with.
    pub fn validate(&self) -> Result<(), FlipError> {
        if self.search.urls.is_empty() {
            return Err(FlipError::Config("search.urls must not be empty".into()));
        }
        if self.search.product_keyword.trim().is_empty() {
            return Err(FlipError::Config("search.product_keyword must not be empty".into()));
        }
        if self.scanner.scan_interval_secs == 0 {
            return Err(FlipError::Config("scanner.scan_interval_secs must be positive".into()));
        }
        if self.scanner.heartbeat_every == 0 {
            return Err(FlipError::Config("scanner.heartbeat_every must be at least 1".into()));
        }
        if self.search.fetch_timeout_secs == 0 {
            return Err(FlipError::Config("search.fetch_timeout_secs must be positive".into()));
        }
        if self.search.max_price < 0 {
            return Err(FlipError::Config(format!(
                "search.max_price ({}) must not be negative",
                self.search.max_price
            )));
        }
        if self.alerts.timeout_secs == 0 {
            return Err(FlipError::Config("alerts.timeout_secs must be positive".into()));
        }
        if self.pricing.profit_green < self.pricing.profit_yellow {
            return Err(FlipError::Config(format!(
                "pricing.profit_green ({}) must be >= pricing.profit_yellow ({})",
                self.pricing.profit_green, self.pricing.profit_yellow
            )));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its (non-empty) value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        match std::env::var(env_name) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(FlipError::MissingCredential(env_name.to_string()).into()),
        }
    }
}
