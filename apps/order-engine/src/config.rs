//! Environment-backed engine settings.

use crate::infrastructure::binance::FUTURES_TESTNET_BASE_URL;

/// Default receive window for signed requests, in milliseconds.
const DEFAULT_RECV_WINDOW: u64 = 5000;

/// Engine settings, loaded from the environment.
///
/// # Environment Variables
///
/// - `BINANCE_API_KEY` / `BINANCE_API_SECRET`: credentials; their absence
///   forces dry-run mode
/// - `BINANCE_BASE_URL`: exchange base URL (default: futures testnet)
/// - `BINANCE_RECV_WINDOW`: signed-request receive window in ms
/// - `DRY_RUN`: "1" / "true" / "yes" simulates orders without sending
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key, if configured.
    pub api_key: Option<String>,
    /// API secret, if configured.
    pub api_secret: Option<String>,
    /// Exchange base URL, without a trailing slash.
    pub base_url: String,
    /// Receive window for signed requests, in milliseconds.
    pub recv_window: u64,
    /// Simulate orders instead of sending them.
    pub dry_run: bool,
}

impl Settings {
    /// Load settings from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty(std::env::var("BINANCE_API_KEY").ok()),
            api_secret: non_empty(std::env::var("BINANCE_API_SECRET").ok()),
            base_url: std::env::var("BINANCE_BASE_URL")
                .unwrap_or_else(|_| FUTURES_TESTNET_BASE_URL.to_string()),
            recv_window: std::env::var("BINANCE_RECV_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RECV_WINDOW),
            dry_run: std::env::var("DRY_RUN")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        }
    }

    /// True when both API key and secret are configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        matches!(
            (&self.api_key, &self.api_secret),
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty()
        )
    }

    /// The API key with the middle masked out, for diagnostics output.
    #[must_use]
    pub fn masked_api_key(&self) -> Option<String> {
        let key = self.api_key.as_deref()?;
        if key.is_empty() {
            return None;
        }
        if key.len() < 8 {
            return Some("***".to_string());
        }
        Some(format!("{}***{}", &key[..4], &key[key.len() - 4..]))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            base_url: FUTURES_TESTNET_BASE_URL.to_string(),
            recv_window: DEFAULT_RECV_WINDOW,
            dry_run: false,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes")
}
