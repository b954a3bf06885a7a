//! Wire-level order shapes.
//!
//! Each of the six order types maps to a fixed parameter set; building
//! them as tagged variants keeps unbounded or implicit fields from ever
//! reaching the wire.

use rust_decimal::Decimal;

use crate::domain::order::{OrderSide, TimeInForce};
use crate::domain::symbol::Symbol;

/// A fully normalized order, one variant per exchange order type.
///
/// Values here are already snapped to the symbol's grid; `params` only
/// formats, it never adjusts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireOrder {
    /// MARKET: quantity only.
    Market {
        /// Trading pair.
        symbol: Symbol,
        /// Order side.
        side: OrderSide,
        /// Order quantity.
        quantity: Decimal,
    },
    /// LIMIT: quantity, price, time in force.
    Limit {
        /// Trading pair.
        symbol: Symbol,
        /// Order side.
        side: OrderSide,
        /// Order quantity.
        quantity: Decimal,
        /// Limit price.
        price: Decimal,
        /// Time in force.
        time_in_force: TimeInForce,
    },
    /// STOP (stop-limit): quantity, price, stop price, time in force.
    StopLimit {
        /// Trading pair.
        symbol: Symbol,
        /// Order side.
        side: OrderSide,
        /// Order quantity.
        quantity: Decimal,
        /// Limit price once triggered.
        price: Decimal,
        /// Trigger price.
        stop_price: Decimal,
        /// Time in force.
        time_in_force: TimeInForce,
    },
    /// STOP_MARKET: quantity, stop price.
    StopMarket {
        /// Trading pair.
        symbol: Symbol,
        /// Order side.
        side: OrderSide,
        /// Order quantity.
        quantity: Decimal,
        /// Trigger price.
        stop_price: Decimal,
    },
    /// TAKE_PROFIT: quantity, price, stop price, time in force.
    TakeProfit {
        /// Trading pair.
        symbol: Symbol,
        /// Order side.
        side: OrderSide,
        /// Order quantity.
        quantity: Decimal,
        /// Limit price once triggered.
        price: Decimal,
        /// Trigger price.
        stop_price: Decimal,
        /// Time in force.
        time_in_force: TimeInForce,
    },
    /// TAKE_PROFIT_MARKET: quantity, stop price.
    TakeProfitMarket {
        /// Trading pair.
        symbol: Symbol,
        /// Order side.
        side: OrderSide,
        /// Order quantity.
        quantity: Decimal,
        /// Trigger price.
        stop_price: Decimal,
    },
}

impl WireOrder {
    /// The exchange wire name for this variant.
    #[must_use]
    pub const fn wire_type(&self) -> &'static str {
        match self {
            Self::Market { .. } => "MARKET",
            Self::Limit { .. } => "LIMIT",
            Self::StopLimit { .. } => "STOP",
            Self::StopMarket { .. } => "STOP_MARKET",
            Self::TakeProfit { .. } => "TAKE_PROFIT",
            Self::TakeProfitMarket { .. } => "TAKE_PROFIT_MARKET",
        }
    }

    /// Convert into the canonical key/value list sent to the exchange.
    ///
    /// Order is deterministic: identity fields first, then quantity, then
    /// the price legs, then time in force. Decimals keep the scale the
    /// normalization produced (50000.00 stays "50000.00").
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("symbol".to_string(), self.symbol().as_str().to_string()),
            ("side".to_string(), self.side().to_string()),
            ("type".to_string(), self.wire_type().to_string()),
            ("quantity".to_string(), self.quantity().to_string()),
        ];

        match self {
            Self::Market { .. } => {}
            Self::Limit {
                price,
                time_in_force,
                ..
            } => {
                params.push(("price".to_string(), price.to_string()));
                params.push(("timeInForce".to_string(), time_in_force.to_string()));
            }
            Self::StopLimit {
                price,
                stop_price,
                time_in_force,
                ..
            }
            | Self::TakeProfit {
                price,
                stop_price,
                time_in_force,
                ..
            } => {
                params.push(("price".to_string(), price.to_string()));
                params.push(("stopPrice".to_string(), stop_price.to_string()));
                params.push(("timeInForce".to_string(), time_in_force.to_string()));
            }
            Self::StopMarket { stop_price, .. } | Self::TakeProfitMarket { stop_price, .. } => {
                params.push(("stopPrice".to_string(), stop_price.to_string()));
            }
        }

        params
    }

    /// Trading pair.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        match self {
            Self::Market { symbol, .. }
            | Self::Limit { symbol, .. }
            | Self::StopLimit { symbol, .. }
            | Self::StopMarket { symbol, .. }
            | Self::TakeProfit { symbol, .. }
            | Self::TakeProfitMarket { symbol, .. } => symbol,
        }
    }

    /// Order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        match self {
            Self::Market { side, .. }
            | Self::Limit { side, .. }
            | Self::StopLimit { side, .. }
            | Self::StopMarket { side, .. }
            | Self::TakeProfit { side, .. }
            | Self::TakeProfitMarket { side, .. } => *side,
        }
    }

    /// Normalized order quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        match self {
            Self::Market { quantity, .. }
            | Self::Limit { quantity, .. }
            | Self::StopLimit { quantity, .. }
            | Self::StopMarket { quantity, .. }
            | Self::TakeProfit { quantity, .. }
            | Self::TakeProfitMarket { quantity, .. } => *quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn get<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn market_params() {
        let order = WireOrder::Market {
            symbol: Symbol::new("BTCUSDT"),
            side: OrderSide::Buy,
            quantity: dec!(0.001),
        };
        let params = order.params();
        assert_eq!(get(&params, "symbol"), Some("BTCUSDT"));
        assert_eq!(get(&params, "side"), Some("BUY"));
        assert_eq!(get(&params, "type"), Some("MARKET"));
        assert_eq!(get(&params, "quantity"), Some("0.001"));
        assert!(get(&params, "price").is_none());
        assert!(get(&params, "stopPrice").is_none());
        assert!(get(&params, "timeInForce").is_none());
    }

    #[test]
    fn limit_params() {
        let order = WireOrder::Limit {
            symbol: Symbol::new("BTCUSDT"),
            side: OrderSide::Sell,
            quantity: dec!(0.002),
            price: dec!(50000.00),
            time_in_force: TimeInForce::Ioc,
        };
        let params = order.params();
        assert_eq!(get(&params, "type"), Some("LIMIT"));
        assert_eq!(get(&params, "price"), Some("50000.00"));
        assert_eq!(get(&params, "timeInForce"), Some("IOC"));
        assert!(get(&params, "stopPrice").is_none());
    }

    #[test]
    fn stop_limit_params() {
        let order = WireOrder::StopLimit {
            symbol: Symbol::new("BTCUSDT"),
            side: OrderSide::Sell,
            quantity: dec!(0.002),
            price: dec!(49000.0),
            stop_price: dec!(49100.0),
            time_in_force: TimeInForce::Gtc,
        };
        let params = order.params();
        assert_eq!(get(&params, "type"), Some("STOP"));
        assert_eq!(get(&params, "price"), Some("49000.0"));
        assert_eq!(get(&params, "stopPrice"), Some("49100.0"));
        assert_eq!(get(&params, "timeInForce"), Some("GTC"));
    }

    #[test]
    fn stop_market_params_omit_price_and_tif() {
        let order = WireOrder::StopMarket {
            symbol: Symbol::new("BTCUSDT"),
            side: OrderSide::Sell,
            quantity: dec!(0.002),
            stop_price: dec!(48000),
        };
        let params = order.params();
        assert_eq!(get(&params, "type"), Some("STOP_MARKET"));
        assert_eq!(get(&params, "stopPrice"), Some("48000"));
        assert!(get(&params, "price").is_none());
        assert!(get(&params, "timeInForce").is_none());
    }

    #[test]
    fn take_profit_params() {
        let order = WireOrder::TakeProfit {
            symbol: Symbol::new("BTCUSDT"),
            side: OrderSide::Sell,
            quantity: dec!(0.001),
            price: dec!(52000),
            stop_price: dec!(51900),
            time_in_force: TimeInForce::Gtc,
        };
        let params = order.params();
        assert_eq!(get(&params, "type"), Some("TAKE_PROFIT"));
        assert_eq!(get(&params, "price"), Some("52000"));
        assert_eq!(get(&params, "stopPrice"), Some("51900"));
    }

    #[test]
    fn take_profit_market_params() {
        let order = WireOrder::TakeProfitMarket {
            symbol: Symbol::new("BTCUSDT"),
            side: OrderSide::Buy,
            quantity: dec!(0.001),
            stop_price: dec!(47000),
        };
        let params = order.params();
        assert_eq!(get(&params, "type"), Some("TAKE_PROFIT_MARKET"));
        assert!(get(&params, "price").is_none());
        assert!(get(&params, "timeInForce").is_none());
    }

    #[test]
    fn params_order_is_deterministic() {
        let order = WireOrder::Market {
            symbol: Symbol::new("BTCUSDT"),
            side: OrderSide::Buy,
            quantity: dec!(1),
        };
        let params = order.params();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["symbol", "side", "type", "quantity"]);
    }
}
