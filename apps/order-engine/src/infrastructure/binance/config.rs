//! Binance adapter configuration.

use std::time::Duration;

use crate::config::Settings;

/// Base URL of the Binance USDⓈ-M futures testnet.
pub const FUTURES_TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";

/// Configuration for the Binance futures REST adapter.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// API key, sent in the `X-MBX-APIKEY` header.
    pub api_key: String,
    /// API secret used for request signing.
    pub api_secret: String,
    /// Base URL, without a trailing slash.
    pub base_url: String,
    /// Receive window for signed requests, in milliseconds.
    pub recv_window: u64,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl BinanceConfig {
    /// Create a new configuration with default recv window and timeout.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: base_url.into(),
            recv_window: 5000,
            timeout: Duration::from_secs(10),
        }
    }

    /// Build from engine settings; absent credentials become empty strings
    /// (safe: the engine forces dry-run before any signed call happens).
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            api_key: settings.api_key.clone().unwrap_or_default(),
            api_secret: settings.api_secret.clone().unwrap_or_default(),
            base_url: settings.base_url.clone(),
            recv_window: settings.recv_window,
            timeout: Duration::from_secs(10),
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the receive window.
    #[must_use]
    pub const fn with_recv_window(mut self, recv_window: u64) -> Self {
        self.recv_window = recv_window;
        self
    }
}
