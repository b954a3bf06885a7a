// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::default_trait_access,
        clippy::field_reassign_with_default
    )
)]

//! Order Engine - Futures Order Gateway Library
//!
//! Places orders against the Binance USDⓈ-M futures REST API, translating
//! a user-level order intent into an exchange-compliant, authenticated
//! HTTP request and classifying the result.
//!
//! # Architecture
//!
//! - **Domain**: order taxonomy and exchange-constraint arithmetic
//!   - `order`: the six-type intent taxonomy and structural validation
//!   - `filters`: per-symbol tick/step grids in exact decimal arithmetic
//! - **Application**: the order construction pipeline
//!   - `engine`: validation → dry-run → constraint lookup → normalization
//!     → wire mapping → dispatch, always terminating in an `OrderResult`
//!   - `filter_cache`: single-flight, lazily loaded constraint cache
//!   - `ports`: the `ExchangePort` interface the pipeline speaks through
//! - **Infrastructure**: adapters
//!   - `binance`: HMAC-SHA256 signed REST client implementing the port

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - order taxonomy and constraint arithmetic, no I/O.
pub mod domain;

/// Application layer - the order construction pipeline and its ports.
pub mod application;

/// Infrastructure layer - exchange adapters.
pub mod infrastructure;

/// Environment-backed settings.
pub mod config;

// Domain re-exports
pub use domain::{
    DomainError, FilterEntry, OrderIntent, OrderSide, OrderType, Symbol, SymbolFilters,
    TimeInForce,
};

// Application re-exports
pub use application::{
    ApiError, ExchangeError, ExchangePort, FilterCache, GridLevel, GridReport, GridRequest,
    NormalizationPolicy, OrderEngine, OrderResult, WireOrder,
};

// Infrastructure re-exports
pub use infrastructure::binance::{BinanceConfig, BinanceHttpClient, FUTURES_TESTNET_BASE_URL};

pub use config::Settings;
