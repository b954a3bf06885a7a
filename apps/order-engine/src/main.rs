//! Order Engine Binary
//!
//! Places futures orders on the Binance testnet from the command line.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-engine -- order --symbol BTCUSDT --side BUY \
//!     --type limit --quantity 0.001 --price 50000
//! cargo run --bin order-engine -- diagnostics --symbol BTCUSDT
//! ```
//!
//! # Environment Variables
//!
//! - `BINANCE_API_KEY` / `BINANCE_API_SECRET`: credentials; when absent the
//!   engine runs in dry-run mode only
//! - `BINANCE_BASE_URL`: exchange base URL (default: futures testnet)
//! - `BINANCE_RECV_WINDOW`: signed-request receive window in ms
//! - `DRY_RUN`: simulate orders without sending
//! - `RUST_LOG`: log filter (default: info)

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde_json::json;

use order_engine::{
    BinanceConfig, BinanceHttpClient, ExchangePort, GridRequest, OrderEngine, OrderIntent,
    OrderSide, OrderType, Settings, Symbol, TimeInForce,
};

#[derive(Parser)]
#[command(name = "order-engine", version, about = "Binance futures testnet order gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Simulate orders without sending them.
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Place a single order.
    Order(OrderArgs),
    /// Place a one-sided grid of limit orders.
    Grid(GridArgs),
    /// Run connectivity and authentication diagnostics.
    Diagnostics {
        /// Symbol to check for listing.
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Show a symbol's tick/step constraints.
    Filters {
        /// Symbol to look up.
        #[arg(long)]
        symbol: String,
    },
    /// Show futures wallet balances.
    Balance,
    /// Show open (non-zero) positions.
    Positions,
}

#[derive(Args)]
struct OrderArgs {
    /// Trading pair symbol, e.g. BTCUSDT.
    #[arg(long)]
    symbol: String,

    /// Order side (BUY or SELL).
    #[arg(long)]
    side: OrderSide,

    /// Order type.
    #[arg(long = "type", default_value = "market")]
    order_type: OrderType,

    /// Order quantity.
    #[arg(long)]
    quantity: Decimal,

    /// Limit price (limit/stop_limit/take_profit).
    #[arg(long)]
    price: Option<Decimal>,

    /// Stop trigger price (stop_limit/stop_market/take_profit*).
    #[arg(long)]
    stop_price: Option<Decimal>,

    /// Time in force for the limit leg.
    #[arg(long, default_value = "GTC")]
    time_in_force: TimeInForce,

    /// Reject off-grid prices instead of auto-adjusting them.
    #[arg(long = "strict-prices")]
    strict: bool,

    /// Provenance tag propagated into logs and results.
    #[arg(long, default_value = "cli")]
    source: String,
}

#[derive(Args)]
struct GridArgs {
    /// Trading pair symbol, e.g. BTCUSDT.
    #[arg(long)]
    symbol: String,

    /// Side for every grid level (BUY or SELL).
    #[arg(long)]
    side: OrderSide,

    /// Number of grid levels.
    #[arg(long)]
    levels: u32,

    /// Percent step between levels.
    #[arg(long)]
    step_pct: Decimal,

    /// Quantity per level.
    #[arg(long)]
    quantity: Decimal,

    /// Manual base price; current ticker price when omitted.
    #[arg(long)]
    base_price: Option<Decimal>,

    /// Time in force for each level.
    #[arg(long, default_value = "GTC")]
    time_in_force: TimeInForce,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut settings = Settings::from_env();
    if cli.dry_run {
        settings.dry_run = true;
    }

    let exchange = Arc::new(BinanceHttpClient::new(BinanceConfig::from_settings(
        &settings,
    ))?);
    let engine = OrderEngine::new(settings, Arc::clone(&exchange));

    match cli.command {
        Command::Order(args) => {
            let intent = OrderIntent {
                symbol: Symbol::new(args.symbol),
                side: args.side,
                order_type: args.order_type,
                quantity: args.quantity,
                price: args.price,
                stop_price: args.stop_price,
                time_in_force: args.time_in_force,
            };
            let result = engine.place_order(&intent, &args.source, args.strict).await;
            print_json(&json!({
                "success": result.success,
                "error": result.error,
                "data": result.raw,
            }))?;
            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Grid(args) => {
            let request = GridRequest {
                symbol: Symbol::new(args.symbol),
                side: args.side,
                base_price: args.base_price,
                levels: args.levels,
                step_pct: args.step_pct,
                quantity: args.quantity,
                time_in_force: args.time_in_force,
            };
            let report = engine.place_grid_orders(&request, "cli-grid").await;
            print_json(&json!({ "grid": report }))?;
            Ok(if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Diagnostics { symbol } => {
            let symbol = symbol.map(Symbol::new);
            let report = engine.diagnostics(symbol.as_ref()).await;
            print_json(&json!({ "diagnostics": report }))?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Filters { symbol } => match engine.symbol_filters(&Symbol::new(symbol)).await? {
            Some(filters) => {
                print_json(&filters)?;
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("Symbol filters not found");
                Ok(ExitCode::FAILURE)
            }
        },

        Command::Balance => {
            if engine.dry_run() {
                eprintln!("Dry-run mode: no authenticated balance available");
                return Ok(ExitCode::SUCCESS);
            }
            let balances = exchange.account_balance().await?;
            print_json(&json!({ "balance": balances }))?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Positions => {
            if engine.dry_run() {
                eprintln!("Dry-run mode: no authenticated positions available");
                return Ok(ExitCode::SUCCESS);
            }
            let positions: Vec<_> = exchange
                .position_risk()
                .await?
                .into_iter()
                .filter(|p| !p.position_amt.is_zero())
                .collect();
            print_json(&json!({ "positions": positions }))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initialize the tracing subscriber, preferring RUST_LOG over --log-level.
fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
