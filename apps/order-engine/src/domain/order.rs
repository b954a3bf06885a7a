//! Order taxonomy and intent validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;
use crate::domain::symbol::Symbol;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            other => Err(DomainError::InvalidValue {
                field: "side".to_string(),
                message: format!("'{other}' is not one of BUY, SELL"),
            }),
        }
    }
}

/// Order type specifying execution behavior.
///
/// Six user-level variants; each maps to a distinct wire parameter set
/// (see `WireOrder`). The stop/take-profit pairs differ in which side of
/// the market the trigger arms on, but carry the same field shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Market order - execute at best available price.
    Market,
    /// Limit order - execute at specified price or better.
    Limit,
    /// Stop-limit order - becomes a limit order when the stop price trades.
    StopLimit,
    /// Stop-market order - becomes a market order when the stop price trades.
    StopMarket,
    /// Take-profit limit order.
    TakeProfit,
    /// Take-profit market order.
    TakeProfitMarket,
}

impl OrderType {
    /// The exchange wire name for this type.
    #[must_use]
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
            Self::StopLimit => "STOP",
            Self::StopMarket => "STOP_MARKET",
            Self::TakeProfit => "TAKE_PROFIT",
            Self::TakeProfitMarket => "TAKE_PROFIT_MARKET",
        }
    }

    /// Returns true if this order type requires a limit price.
    #[must_use]
    pub const fn requires_limit_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit | Self::TakeProfit)
    }

    /// Returns true if this order type requires a stop/trigger price.
    #[must_use]
    pub const fn requires_stop_price(&self) -> bool {
        matches!(
            self,
            Self::StopLimit | Self::StopMarket | Self::TakeProfit | Self::TakeProfitMarket
        )
    }

    /// Returns true if the wire request carries a time-in-force field.
    #[must_use]
    pub const fn carries_time_in_force(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit | Self::TakeProfit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

impl FromStr for OrderType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "market" => Ok(Self::Market),
            "limit" => Ok(Self::Limit),
            "stop_limit" => Ok(Self::StopLimit),
            "stop_market" => Ok(Self::StopMarket),
            "take_profit" => Ok(Self::TakeProfit),
            "take_profit_market" => Ok(Self::TakeProfitMarket),
            other => Err(DomainError::InvalidValue {
                field: "order_type".to_string(),
                message: format!(
                    "'{other}' is not one of market, limit, stop_limit, stop_market, \
                     take_profit, take_profit_market"
                ),
            }),
        }
    }
}

/// Time in force specifying order validity duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Good-til-canceled.
    Gtc,
    /// Immediate-or-cancel (fill immediately, cancel remainder).
    Ioc,
    /// Fill-or-kill (all or nothing, immediate execution required).
    Fok,
}

impl Default for TimeInForce {
    fn default() -> Self {
        Self::Gtc
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gtc => write!(f, "GTC"),
            Self::Ioc => write!(f, "IOC"),
            Self::Fok => write!(f, "FOK"),
        }
    }
}

impl FromStr for TimeInForce {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GTC" => Ok(Self::Gtc),
            "IOC" => Ok(Self::Ioc),
            "FOK" => Ok(Self::Fok),
            other => Err(DomainError::InvalidValue {
                field: "time_in_force".to_string(),
                message: format!("'{other}' is not one of GTC, IOC, FOK"),
            }),
        }
    }
}

/// A user-level order description, before normalization.
///
/// An intent is never mutated after validation; the construction pipeline
/// produces a new set of wire parameters instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Trading pair.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Order quantity (base asset units).
    pub quantity: Decimal,
    /// Limit price, where the type requires one.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Stop/trigger price, where the type requires one.
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    /// Time in force for the limit leg.
    #[serde(default)]
    pub time_in_force: TimeInForce,
}

impl OrderIntent {
    /// Create a market order intent.
    #[must_use]
    pub const fn market(symbol: Symbol, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol,
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
        }
    }

    /// Create a limit order intent.
    #[must_use]
    pub const fn limit(symbol: Symbol, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol,
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
        }
    }

    /// Set the time in force.
    #[must_use]
    pub const fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    /// Structural validation of the intent.
    ///
    /// Rules are applied in order and the first failure wins. Validation is
    /// purely local: it never consults symbol filters (that happens later in
    /// the pipeline, because it needs a network-backed lookup).
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.quantity <= Decimal::ZERO {
            return Err(DomainError::InvalidValue {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
            });
        }

        if self.order_type.requires_limit_price() && !is_positive(self.price) {
            return Err(DomainError::InvalidValue {
                field: "price".to_string(),
                message: format!(
                    "price required and must be positive for {} orders",
                    self.order_type
                ),
            });
        }

        if self.order_type.requires_stop_price() && !is_positive(self.stop_price) {
            return Err(DomainError::InvalidValue {
                field: "stop_price".to_string(),
                message: format!(
                    "stop_price required and must be positive for {} orders",
                    self.order_type
                ),
            });
        }

        self.symbol.validate()
    }
}

fn is_positive(value: Option<Decimal>) -> bool {
    value.is_some_and(|v| v > Decimal::ZERO)
}
