//! Per-symbol trading constraints (tick/step grid).
//!
//! Every tradable symbol carries a price grid (`price_min` + multiples of
//! `tick_size`) and a quantity grid (`qty_min` + multiples of `step_size`).
//! All arithmetic is exact `Decimal`: a tick of 0.01 must never misclassify
//! 10.00 as off-grid through binary floating-point representation error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::symbol::Symbol;

/// One raw entry of a symbol's exchange-metadata filter list.
///
/// Only the fields the engine consumes are modeled; the exchange sends
/// more per filter type. Absent fields deserialize to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterEntry {
    /// Filter discriminator, e.g. "PRICE_FILTER" or "LOT_SIZE".
    pub filter_type: String,
    /// Minimum price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    /// Maximum price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    /// Price quantum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_size: Option<String>,
    /// Minimum quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_qty: Option<String>,
    /// Maximum quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qty: Option<String>,
    /// Quantity quantum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size: Option<String>,
}

/// A symbol's tradable price/quantity grid.
///
/// Immutable once constructed from exchange metadata. A zero quantum means
/// "no grid constraint"; a zero upper bound means "no upper bound".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolFilters {
    symbol: Symbol,
    price_min: Decimal,
    price_max: Decimal,
    tick_size: Decimal,
    qty_min: Decimal,
    qty_max: Decimal,
    step_size: Decimal,
}

impl SymbolFilters {
    /// Create a constraint model from explicit bounds.
    #[must_use]
    pub const fn new(
        symbol: Symbol,
        price_min: Decimal,
        price_max: Decimal,
        tick_size: Decimal,
        qty_min: Decimal,
        qty_max: Decimal,
        step_size: Decimal,
    ) -> Self {
        Self {
            symbol,
            price_min,
            price_max,
            tick_size,
            qty_min,
            qty_max,
            step_size,
        }
    }

    /// Build a constraint model from a symbol's raw filter list.
    ///
    /// Takes the price bounds from `PRICE_FILTER` and the quantity bounds
    /// from `LOT_SIZE` / `MARKET_LOT_SIZE` (later entries win). Missing
    /// filters leave the defaults (tick/step 1, bounds 0); unrecognized or
    /// malformed entries are skipped, not fatal.
    #[must_use]
    pub fn from_filter_entries(symbol: Symbol, entries: &[FilterEntry]) -> Self {
        let mut filters = Self::new(
            symbol,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ONE,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ONE,
        );

        for entry in entries {
            match entry.filter_type.as_str() {
                "PRICE_FILTER" => {
                    if let Some(v) = parse_bound(entry.min_price.as_deref()) {
                        filters.price_min = v;
                    }
                    if let Some(v) = parse_bound(entry.max_price.as_deref()) {
                        filters.price_max = v;
                    }
                    if let Some(v) = parse_bound(entry.tick_size.as_deref()) {
                        filters.tick_size = v;
                    }
                }
                "LOT_SIZE" | "MARKET_LOT_SIZE" => {
                    if let Some(v) = parse_bound(entry.min_qty.as_deref()) {
                        filters.qty_min = v;
                    }
                    if let Some(v) = parse_bound(entry.max_qty.as_deref()) {
                        filters.qty_max = v;
                    }
                    if let Some(v) = parse_bound(entry.step_size.as_deref()) {
                        filters.step_size = v;
                    }
                }
                _ => {}
            }
        }

        filters
    }

    /// The symbol these constraints belong to.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Minimum valid price.
    #[must_use]
    pub const fn price_min(&self) -> Decimal {
        self.price_min
    }

    /// Maximum valid price; zero means unbounded.
    #[must_use]
    pub const fn price_max(&self) -> Decimal {
        self.price_max
    }

    /// Price quantum; zero means no grid constraint.
    #[must_use]
    pub const fn tick_size(&self) -> Decimal {
        self.tick_size
    }

    /// Minimum valid quantity.
    #[must_use]
    pub const fn qty_min(&self) -> Decimal {
        self.qty_min
    }

    /// Maximum valid quantity; zero means unbounded.
    #[must_use]
    pub const fn qty_max(&self) -> Decimal {
        self.qty_max
    }

    /// Quantity quantum; zero means no grid constraint.
    #[must_use]
    pub const fn step_size(&self) -> Decimal {
        self.step_size
    }

    /// Returns true if the price is within bounds and on the tick grid.
    #[must_use]
    pub fn validate_price(&self, price: Decimal) -> bool {
        on_grid(price, self.price_min, self.price_max, self.tick_size)
    }

    /// Returns true if the quantity is within bounds and on the step grid.
    #[must_use]
    pub fn validate_qty(&self, qty: Decimal) -> bool {
        on_grid(qty, self.qty_min, self.qty_max, self.step_size)
    }

    /// Floor the price to the nearest grid point at or below it.
    ///
    /// Rounding is always down, toward `price_min`: for stop and limit legs
    /// a lower price is the conservative substitution.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::OutOfRange`] if the price is below
    /// `price_min` or above a non-zero `price_max`.
    pub fn snap_price(&self, price: Decimal) -> Result<Decimal, DomainError> {
        snap("price", price, self.price_min, self.price_max, self.tick_size)
    }

    /// Floor the quantity to the nearest grid point at or below it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::OutOfRange`] if the quantity is below
    /// `qty_min` or above a non-zero `qty_max`.
    pub fn snap_qty(&self, qty: Decimal) -> Result<Decimal, DomainError> {
        snap("quantity", qty, self.qty_min, self.qty_max, self.step_size)
    }
}

fn parse_bound(raw: Option<&str>) -> Option<Decimal> {
    raw.and_then(|s| s.parse::<Decimal>().ok())
        .filter(|d| !d.is_sign_negative())
}

fn on_grid(value: Decimal, min: Decimal, max: Decimal, quantum: Decimal) -> bool {
    if value < min {
        return false;
    }
    if max > Decimal::ZERO && value > max {
        return false;
    }
    if quantum.is_zero() {
        return true;
    }
    ((value - min) % quantum).is_zero()
}

fn snap(
    field: &str,
    value: Decimal,
    min: Decimal,
    max: Decimal,
    quantum: Decimal,
) -> Result<Decimal, DomainError> {
    if value < min || (max > Decimal::ZERO && value > max) {
        return Err(DomainError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    if quantum.is_zero() {
        return Ok(value);
    }
    let steps = ((value - min) / quantum).floor();
    Ok(min + steps * quantum)
}
