//! Hand-rolled stub exchange for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal_macros::dec;

use crate::application::ports::{
    AccountInfo, AssetBalance, ExchangeError, ExchangeInfo, ExchangePort, PositionRisk, ServerTime,
    SymbolInfo, TickerPrice,
};
use crate::domain::filters::FilterEntry;
use crate::domain::symbol::Symbol;

/// Counting stub implementation of [`ExchangePort`].
///
/// Serves one symbol (BTCUSDT, tick 0.10, step 0.001) and records every
/// call so tests can assert what did, and did not, reach the transport.
#[derive(Default)]
pub struct StubExchange {
    /// Number of `exchange_info` calls observed.
    pub info_calls: AtomicUsize,
    /// Number of `place_order` calls observed.
    pub order_calls: AtomicUsize,
    /// When set, `exchange_info` fails with a network error.
    pub fail_exchange_info: AtomicBool,
    /// When set, `place_order` fails with this error.
    pub order_error: Mutex<Option<ExchangeError>>,
    /// Parameters of the most recent `place_order` call.
    pub last_order_params: Mutex<Option<Vec<(String, String)>>>,
}

impl StubExchange {
    /// Arrange for `place_order` to fail.
    pub fn fail_orders_with(&self, error: ExchangeError) {
        *self.order_error.lock().unwrap() = Some(error);
    }

    /// The value sent for `key` in the most recent order, if any.
    pub fn sent_param(&self, key: &str) -> Option<String> {
        self.last_order_params
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|params| {
                params
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.clone())
            })
    }
}

#[async_trait]
impl ExchangePort for StubExchange {
    async fn ping(&self) -> Result<(), ExchangeError> {
        Ok(())
    }

    async fn server_time(&self) -> Result<ServerTime, ExchangeError> {
        Ok(ServerTime {
            server_time: 1_700_000_000_000,
        })
    }

    async fn exchange_info(&self) -> Result<ExchangeInfo, ExchangeError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange_info.load(Ordering::SeqCst) {
            return Err(ExchangeError::Network("exchange info unavailable".to_string()));
        }
        Ok(ExchangeInfo {
            symbols: vec![SymbolInfo {
                symbol: "BTCUSDT".to_string(),
                filters: vec![
                    FilterEntry {
                        filter_type: "PRICE_FILTER".to_string(),
                        min_price: Some("0".to_string()),
                        max_price: Some("0".to_string()),
                        tick_size: Some("0.10".to_string()),
                        min_qty: None,
                        max_qty: None,
                        step_size: None,
                    },
                    FilterEntry {
                        filter_type: "LOT_SIZE".to_string(),
                        min_price: None,
                        max_price: None,
                        tick_size: None,
                        min_qty: Some("0".to_string()),
                        max_qty: Some("0".to_string()),
                        step_size: Some("0.001".to_string()),
                    },
                ],
            }],
        })
    }

    async fn place_order(
        &self,
        params: &[(String, String)],
    ) -> Result<serde_json::Value, ExchangeError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_order_params.lock().unwrap() = Some(params.to_vec());
        if let Some(error) = self.order_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(serde_json::json!({"orderId": 1, "status": "NEW"}))
    }

    async fn account_balance(&self) -> Result<Vec<AssetBalance>, ExchangeError> {
        Ok(vec![AssetBalance {
            asset: "USDT".to_string(),
            balance: dec!(1000),
            available_balance: Some(dec!(900)),
        }])
    }

    async fn account(&self) -> Result<AccountInfo, ExchangeError> {
        Ok(AccountInfo {
            assets: vec![serde_json::json!({"asset": "USDT"})],
            positions: vec![serde_json::json!({"symbol": "BTCUSDT"})],
        })
    }

    async fn position_risk(&self) -> Result<Vec<PositionRisk>, ExchangeError> {
        Ok(vec![PositionRisk {
            symbol: "BTCUSDT".to_string(),
            position_amt: dec!(0.002),
            entry_price: Some(dec!(50000)),
        }])
    }

    async fn ticker_price(&self, symbol: &Symbol) -> Result<TickerPrice, ExchangeError> {
        Ok(TickerPrice {
            symbol: symbol.as_str().to_string(),
            price: dec!(50000),
        })
    }
}
