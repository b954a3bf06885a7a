//! Exchange port (driven port).
//!
//! Interface the order pipeline uses to talk to the futures exchange,
//! together with the transport error type and the response shapes the
//! engine consumes. Adapters live in `infrastructure`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::filters::FilterEntry;
use crate::domain::symbol::Symbol;

/// An error response from the exchange REST API.
///
/// Carries everything the exchange said: HTTP status, the exchange's
/// numeric error code when the body had one, the human-readable message,
/// and the raw response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Exchange-specific numeric error code, if the body carried one.
    pub code: Option<i64>,
    /// Human-readable message.
    pub message: String,
    /// Raw response body.
    pub body: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(
                f,
                "HTTP {} exchange error {}: {}",
                self.status, code, self.message
            ),
            None => write!(f, "HTTP {} exchange error: {}", self.status, self.message),
        }
    }
}

/// Transport-level errors, disjoint from local validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// The exchange rejected the request (HTTP >= 400 or negative body code).
    #[error("{0}")]
    Api(ApiError),

    /// The call failed at the network layer.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape.
    #[error("response parse error: {0}")]
    Parse(String),
}

impl ExchangeError {
    /// The exchange's numeric error code, when one was returned.
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Api(err) => err.code,
            _ => None,
        }
    }
}

/// Server time response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    /// Server clock in milliseconds since epoch.
    pub server_time: i64,
}

/// Exchange metadata: the symbol list with per-symbol filter arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeInfo {
    /// All listed symbols.
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
}

/// One symbol's entry in the exchange metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Symbol name.
    pub symbol: String,
    /// Raw constraint filter list.
    #[serde(default)]
    pub filters: Vec<FilterEntry>,
}

/// One asset's futures wallet balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    /// Asset name, e.g. "USDT".
    pub asset: String,
    /// Wallet balance.
    pub balance: Decimal,
    /// Balance available for new orders.
    #[serde(default)]
    pub available_balance: Option<Decimal>,
}

/// Futures account summary (assets and positions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Per-asset balances.
    #[serde(default)]
    pub assets: Vec<serde_json::Value>,
    /// Per-symbol positions.
    #[serde(default)]
    pub positions: Vec<serde_json::Value>,
}

/// One symbol's position risk entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRisk {
    /// Symbol name.
    pub symbol: String,
    /// Signed position size; zero means flat.
    pub position_amt: Decimal,
    /// Average entry price.
    #[serde(default)]
    pub entry_price: Option<Decimal>,
}

/// Latest traded price for a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerPrice {
    /// Symbol name.
    pub symbol: String,
    /// Last price.
    pub price: Decimal,
}

/// Port for exchange interactions.
///
/// Each method issues at most one outstanding HTTP call and awaits it
/// fully; nothing is retried at this level.
#[async_trait]
pub trait ExchangePort: Send + Sync {
    /// Connectivity check.
    async fn ping(&self) -> Result<(), ExchangeError>;

    /// Exchange server clock.
    async fn server_time(&self) -> Result<ServerTime, ExchangeError>;

    /// Exchange metadata (symbol list with filter arrays).
    async fn exchange_info(&self) -> Result<ExchangeInfo, ExchangeError>;

    /// Place an order from a prepared wire parameter list (signed).
    ///
    /// Returns the exchange's response object verbatim.
    async fn place_order(
        &self,
        params: &[(String, String)],
    ) -> Result<serde_json::Value, ExchangeError>;

    /// Futures wallet balances (signed).
    async fn account_balance(&self) -> Result<Vec<AssetBalance>, ExchangeError>;

    /// Futures account summary (signed).
    async fn account(&self) -> Result<AccountInfo, ExchangeError>;

    /// Position risk entries for all symbols (signed).
    async fn position_risk(&self) -> Result<Vec<PositionRisk>, ExchangeError>;

    /// Latest traded price for one symbol (unsigned).
    async fn ticker_price(&self, symbol: &Symbol) -> Result<TickerPrice, ExchangeError>;
}
