//! Order construction pipeline.
//!
//! Orchestrates validation, the dry-run short-circuit, constraint lookup,
//! per-field normalization, wire mapping, and transport dispatch. Every
//! path terminates in an [`OrderResult`]; no error escapes to the caller.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::application::filter_cache::FilterCache;
use crate::application::ports::{ExchangeError, ExchangePort};
use crate::application::result::OrderResult;
use crate::application::wire::WireOrder;
use crate::config::Settings;
use crate::domain::errors::DomainError;
use crate::domain::filters::SymbolFilters;
use crate::domain::order::{OrderIntent, OrderSide, OrderType, TimeInForce};
use crate::domain::symbol::Symbol;

/// Per-field strict-mode coverage for normalization.
///
/// The `strict` flag callers pass selects [`Self::strict_prices`]: both
/// price legs reject off-grid values while the quantity still snaps
/// silently. The per-field split exists because the legs have been gated
/// inconsistently upstream; callers that want different coverage can
/// construct a policy explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationPolicy {
    /// Reject (rather than snap) an off-step quantity.
    pub strict_quantity: bool,
    /// Reject (rather than snap) an off-tick limit price.
    pub strict_price: bool,
    /// Reject (rather than snap) an off-tick stop/trigger price.
    pub strict_stop_price: bool,
}

impl NormalizationPolicy {
    /// The same strictness for every normalized field.
    #[must_use]
    pub const fn uniform(strict: bool) -> Self {
        Self {
            strict_quantity: strict,
            strict_price: strict,
            strict_stop_price: strict,
        }
    }

    /// Snap everything silently (the default behavior).
    #[must_use]
    pub const fn adjust() -> Self {
        Self::uniform(false)
    }

    /// Strict price and stop legs, auto-adjusted quantity.
    ///
    /// The policy the `strict` flag maps to: rejecting a misquantized
    /// price protects the level the caller chose, while a floored
    /// quantity only shrinks the position.
    #[must_use]
    pub const fn strict_prices() -> Self {
        Self {
            strict_quantity: false,
            strict_price: true,
            strict_stop_price: true,
        }
    }
}

/// A one-sided ladder of limit orders around a base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRequest {
    /// Trading pair.
    pub symbol: Symbol,
    /// Side for every rung.
    pub side: OrderSide,
    /// Manual base price; the current ticker price when absent.
    pub base_price: Option<Decimal>,
    /// Number of rungs.
    pub levels: u32,
    /// Percent step between rungs.
    pub step_pct: Decimal,
    /// Quantity per rung.
    pub quantity: Decimal,
    /// Time in force for each rung.
    pub time_in_force: TimeInForce,
}

/// One rung of a placed grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLevel {
    /// Rung index, starting at 1.
    pub level: u32,
    /// The rung's target price, before normalization.
    pub price: Decimal,
    /// Placement outcome for this rung.
    pub result: OrderResult,
}

/// Outcome of a grid placement run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridReport {
    /// False only when the grid could not start (bad request or no base
    /// price); individual rung failures leave this true.
    pub success: bool,
    /// Reason the grid could not start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Resolved base price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Decimal>,
    /// Rungs accepted by the exchange.
    pub placed: usize,
    /// Rungs rejected.
    pub failed: usize,
    /// Per-rung outcomes.
    pub levels: Vec<GridLevel>,
}

impl GridReport {
    fn not_started(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            base_price: None,
            placed: 0,
            failed: 0,
            levels: Vec::new(),
        }
    }
}

/// The order construction pipeline over one exchange connection.
///
/// Owns the symbol constraint cache; otherwise stateless across calls.
pub struct OrderEngine<E: ExchangePort> {
    settings: Settings,
    exchange: Arc<E>,
    filters: FilterCache,
}

impl<E: ExchangePort> OrderEngine<E> {
    /// Create an engine.
    ///
    /// Missing API credentials force dry-run mode unconditionally,
    /// whatever the settings requested.
    #[must_use]
    pub fn new(mut settings: Settings, exchange: Arc<E>) -> Self {
        if !settings.has_credentials() {
            if !settings.dry_run {
                tracing::warn!(
                    "API key/secret missing; operating in dry-run mode only. \
                     Set BINANCE_API_KEY/BINANCE_API_SECRET for live orders."
                );
            }
            settings.dry_run = true;
        }
        Self {
            settings,
            exchange,
            filters: FilterCache::new(),
        }
    }

    /// Whether orders are simulated instead of sent.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.settings.dry_run
    }

    /// The engine's effective settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Place one order; every failure mode returns a failed result.
    ///
    /// `strict` rejects off-grid price legs instead of snapping them; the
    /// quantity is snapped in either mode.
    pub async fn place_order(&self, intent: &OrderIntent, source: &str, strict: bool) -> OrderResult {
        let policy = if strict {
            NormalizationPolicy::strict_prices()
        } else {
            NormalizationPolicy::adjust()
        };
        self.place_order_with_policy(intent, source, policy).await
    }

    /// Place one order under an explicit per-field normalization policy.
    pub async fn place_order_with_policy(
        &self,
        intent: &OrderIntent,
        source: &str,
        policy: NormalizationPolicy,
    ) -> OrderResult {
        tracing::info!(
            symbol = %intent.symbol,
            side = %intent.side,
            order_type = %intent.order_type,
            quantity = %intent.quantity,
            source,
            "Placing order"
        );

        if let Err(err) = intent.validate() {
            tracing::warn!(error = %err, source, "Order validation failed");
            return OrderResult::failed(err.to_string());
        }

        if self.dry_run() {
            tracing::info!(source, "Dry-run: simulating order placement");
            return simulate(intent, source);
        }

        let filters = self.resolve_filters(&intent.symbol).await;
        let wire = match build_wire_order(intent, filters.as_ref(), policy) {
            Ok(wire) => wire,
            Err(err) => {
                tracing::warn!(error = %err, source, "Order normalization failed");
                return OrderResult::failed(err.to_string());
            }
        };

        match self.exchange.place_order(&wire.params()).await {
            Ok(mut raw) => {
                if let Some(object) = raw.as_object_mut() {
                    object.insert("source".to_string(), json!(source));
                }
                tracing::info!(
                    order_id = raw.get("orderId").and_then(serde_json::Value::as_i64),
                    status = raw.get("status").and_then(serde_json::Value::as_str),
                    "Order accepted"
                );
                OrderResult::ok(raw)
            }
            Err(err) => {
                tracing::error!(error = %err, code = err.code(), source, "Order failed");
                OrderResult::failed(err.to_string())
            }
        }
    }

    /// Look up a symbol's constraint model, loading the cache on first use.
    ///
    /// # Errors
    ///
    /// Propagates the transport error when the metadata fetch fails.
    pub async fn symbol_filters(
        &self,
        symbol: &Symbol,
    ) -> Result<Option<SymbolFilters>, ExchangeError> {
        self.filters.ensure(self.exchange.as_ref(), false).await?;
        Ok(self.filters.get(symbol).await)
    }

    /// Discard and reload the constraint cache.
    ///
    /// # Errors
    ///
    /// Propagates the transport error when the metadata fetch fails.
    pub async fn refresh_filters(&self) -> Result<(), ExchangeError> {
        self.filters.ensure(self.exchange.as_ref(), true).await
    }

    /// Connectivity and authentication diagnostics.
    ///
    /// Each probe is independent; a failing probe records an `*_error`
    /// entry instead of aborting the report. Authenticated probes are
    /// skipped in dry-run mode.
    pub async fn diagnostics(&self, symbol: Option<&Symbol>) -> Map<String, Value> {
        let mut report = Map::new();

        match self.exchange.ping().await {
            Ok(()) => {
                report.insert("ping".to_string(), json!({"ok": true}));
            }
            Err(err) => {
                report.insert("ping_error".to_string(), json!(err.to_string()));
            }
        }

        match self.exchange.server_time().await {
            Ok(server) => {
                let local_ms = Utc::now().timestamp_millis();
                report.insert("server_time".to_string(), json!(server.server_time));
                report.insert(
                    "time_delta_ms".to_string(),
                    json!(local_ms - server.server_time),
                );
            }
            Err(err) => {
                report.insert("time_error".to_string(), json!(err.to_string()));
            }
        }

        match self.exchange.exchange_info().await {
            Ok(info) => {
                report.insert("exchange_info_symbols".to_string(), json!(info.symbols.len()));
                if let Some(symbol) = symbol {
                    let listed = info
                        .symbols
                        .iter()
                        .any(|entry| entry.symbol.eq_ignore_ascii_case(symbol.as_str()));
                    report.insert("symbol_listed".to_string(), json!(listed));
                }
            }
            Err(err) => {
                report.insert("exchange_info_error".to_string(), json!(err.to_string()));
            }
        }

        if !self.dry_run() {
            match self.exchange.account_balance().await {
                Ok(balances) => {
                    report.insert("balance_count".to_string(), json!(balances.len()));
                }
                Err(err) => {
                    report.insert("balance_error".to_string(), json!(err.to_string()));
                }
            }
            match self.exchange.account().await {
                Ok(account) => {
                    report.insert("assets".to_string(), json!(account.assets.len()));
                    report.insert("positions".to_string(), json!(account.positions.len()));
                }
                Err(err) => {
                    report.insert("account_error".to_string(), json!(err.to_string()));
                }
            }
        }

        if let Some(masked) = self.settings.masked_api_key() {
            report.insert("api_key_masked".to_string(), json!(masked));
        }

        report
    }

    /// Place a one-sided grid of limit orders around a base price.
    ///
    /// BUY grids step below the base, SELL grids above. Each rung goes
    /// through the full `place_order` pipeline in adjust mode.
    pub async fn place_grid_orders(&self, request: &GridRequest, source: &str) -> GridReport {
        if request.levels == 0 {
            return GridReport::not_started("levels must be positive");
        }
        if request.step_pct <= Decimal::ZERO {
            return GridReport::not_started("step_pct must be positive");
        }
        if request.quantity <= Decimal::ZERO {
            return GridReport::not_started("quantity must be positive");
        }

        let base = match request.base_price {
            Some(price) if price > Decimal::ZERO => price,
            Some(price) => {
                return GridReport::not_started(format!("base_price {price} must be positive"));
            }
            None => match self.exchange.ticker_price(&request.symbol).await {
                Ok(ticker) => ticker.price,
                Err(err) => {
                    tracing::warn!(error = %err, symbol = %request.symbol, "Base price lookup failed");
                    return GridReport::not_started(format!("base price lookup failed: {err}"));
                }
            },
        };

        tracing::info!(
            symbol = %request.symbol,
            side = %request.side,
            levels = request.levels,
            step_pct = %request.step_pct,
            base = %base,
            source,
            "Placing grid orders"
        );

        let mut levels = Vec::with_capacity(request.levels as usize);
        let (mut placed, mut failed) = (0, 0);

        for level in 1..=request.levels {
            let offset = base * request.step_pct * Decimal::from(level) / Decimal::ONE_HUNDRED;
            let price = match request.side {
                OrderSide::Buy => base - offset,
                OrderSide::Sell => base + offset,
            };

            let result = if price > Decimal::ZERO {
                let intent = OrderIntent {
                    symbol: request.symbol.clone(),
                    side: request.side,
                    order_type: OrderType::Limit,
                    quantity: request.quantity,
                    price: Some(price),
                    stop_price: None,
                    time_in_force: request.time_in_force,
                };
                self.place_order(&intent, source, false).await
            } else {
                OrderResult::failed(format!("grid price {price} not positive"))
            };

            if result.success {
                placed += 1;
            } else {
                failed += 1;
            }
            levels.push(GridLevel {
                level,
                price,
                result,
            });
        }

        GridReport {
            success: true,
            error: None,
            base_price: Some(base),
            placed,
            failed,
            levels,
        }
    }

    /// Best-effort constraint resolution; absence disables normalization.
    async fn resolve_filters(&self, symbol: &Symbol) -> Option<SymbolFilters> {
        if let Err(err) = self.filters.ensure(self.exchange.as_ref(), false).await {
            tracing::warn!(error = %err, "Symbol filter load failed; skipping normalization");
            return None;
        }
        let filters = self.filters.get(symbol).await;
        if filters.is_none() {
            tracing::debug!(%symbol, "No filters for symbol; skipping normalization");
        }
        filters
    }
}

/// Synthesize the dry-run response without touching the transport.
fn simulate(intent: &OrderIntent, source: &str) -> OrderResult {
    OrderResult::ok(json!({
        "symbol": intent.symbol.as_str(),
        "side": intent.side.to_string(),
        "type": intent.order_type.wire_name(),
        "status": "SIMULATED",
        "origQty": intent.quantity.to_string(),
        "price": intent.price.map(|p| p.to_string()),
        "stopPrice": intent.stop_price.map(|p| p.to_string()),
        "timeInForce": intent.time_in_force.to_string(),
        "source": source,
    }))
}

/// Map a validated intent onto its wire variant, normalizing each leg.
fn build_wire_order(
    intent: &OrderIntent,
    filters: Option<&SymbolFilters>,
    policy: NormalizationPolicy,
) -> Result<WireOrder, DomainError> {
    let symbol = intent.symbol.clone();
    let side = intent.side;
    let quantity = normalize_qty(filters, intent.quantity, policy.strict_quantity)?;

    match intent.order_type {
        OrderType::Market => Ok(WireOrder::Market {
            symbol,
            side,
            quantity,
        }),
        OrderType::Limit => Ok(WireOrder::Limit {
            symbol,
            side,
            quantity,
            price: normalize_price(filters, "price", require(intent.price, "price")?, policy.strict_price)?,
            time_in_force: intent.time_in_force,
        }),
        OrderType::StopLimit => Ok(WireOrder::StopLimit {
            symbol,
            side,
            quantity,
            price: normalize_price(filters, "price", require(intent.price, "price")?, policy.strict_price)?,
            stop_price: normalize_price(
                filters,
                "stop_price",
                require(intent.stop_price, "stop_price")?,
                policy.strict_stop_price,
            )?,
            time_in_force: intent.time_in_force,
        }),
        OrderType::StopMarket => Ok(WireOrder::StopMarket {
            symbol,
            side,
            quantity,
            stop_price: normalize_price(
                filters,
                "stop_price",
                require(intent.stop_price, "stop_price")?,
                policy.strict_stop_price,
            )?,
        }),
        OrderType::TakeProfit => Ok(WireOrder::TakeProfit {
            symbol,
            side,
            quantity,
            price: normalize_price(filters, "price", require(intent.price, "price")?, policy.strict_price)?,
            stop_price: normalize_price(
                filters,
                "stop_price",
                require(intent.stop_price, "stop_price")?,
                policy.strict_stop_price,
            )?,
            time_in_force: intent.time_in_force,
        }),
        OrderType::TakeProfitMarket => Ok(WireOrder::TakeProfitMarket {
            symbol,
            side,
            quantity,
            stop_price: normalize_price(
                filters,
                "stop_price",
                require(intent.stop_price, "stop_price")?,
                policy.strict_stop_price,
            )?,
        }),
    }
}

fn require(value: Option<Decimal>, field: &str) -> Result<Decimal, DomainError> {
    value.ok_or_else(|| DomainError::InvalidValue {
        field: field.to_string(),
        message: format!("{field} is required"),
    })
}

fn normalize_price(
    filters: Option<&SymbolFilters>,
    field: &'static str,
    value: Decimal,
    strict: bool,
) -> Result<Decimal, DomainError> {
    let Some(model) = filters else {
        return Ok(value);
    };
    if model.validate_price(value) {
        return Ok(value);
    }
    let nearest = model.snap_price(value).map_err(|err| err.for_field(field))?;
    if strict {
        return Err(DomainError::OffGrid {
            field: field.to_string(),
            wanted: value,
            nearest,
            quantum: model.tick_size(),
        });
    }
    tracing::warn!(
        field,
        symbol = %model.symbol(),
        wanted = %value,
        adjusted = %nearest,
        "Adjusted off-grid price"
    );
    Ok(nearest)
}

fn normalize_qty(
    filters: Option<&SymbolFilters>,
    value: Decimal,
    strict: bool,
) -> Result<Decimal, DomainError> {
    let Some(model) = filters else {
        return Ok(value);
    };
    if model.validate_qty(value) {
        return Ok(value);
    }
    let nearest = model.snap_qty(value)?;
    if strict {
        return Err(DomainError::OffGrid {
            field: "quantity".to_string(),
            wanted: value,
            nearest,
            quantum: model.step_size(),
        });
    }
    tracing::warn!(
        field = "quantity",
        symbol = %model.symbol(),
        wanted = %value,
        adjusted = %nearest,
        "Adjusted off-step quantity"
    );
    Ok(nearest)
}
