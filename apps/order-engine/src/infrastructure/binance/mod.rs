//! Binance USDⓈ-M futures REST adapter.
//!
//! Implementation of `ExchangePort` for the Binance futures API with:
//! - HMAC-SHA256 request signing over the canonical query string
//! - Millisecond timestamp / recvWindow injection on signed calls
//! - Uniform response classification into `ExchangeError`

mod config;
mod http_client;
mod signer;

pub use config::{BinanceConfig, FUTURES_TESTNET_BASE_URL};
pub use http_client::BinanceHttpClient;
pub use signer::{RequestSigner, build_query_string};
