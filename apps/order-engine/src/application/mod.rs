//! Application layer - the order construction pipeline and its ports.

pub mod engine;
pub mod filter_cache;
pub mod ports;
pub mod result;
pub mod wire;

#[cfg(test)]
pub(crate) mod stub_exchange;

pub use engine::{GridLevel, GridReport, GridRequest, NormalizationPolicy, OrderEngine};
pub use filter_cache::FilterCache;
pub use ports::{ApiError, ExchangeError, ExchangePort};
pub use result::OrderResult;
pub use wire::WireOrder;
