//! `backtest` subcommand: loads a config and a candle series, runs the
//! [`crypto_strategies::BacktestDriver`] against the configured strategy,
//! and prints a console summary in the spirit of the reference
//! repository's `commands::backtest::run`.

use anyhow::{bail, Result};
use tracing::info;

use crypto_strategies::strategies::grid::{GridConfig, GridStrategy};
use crypto_strategies::types::OrderAction;
use crypto_strategies::{data, BacktestConfig, BacktestDriver};

pub fn run(config_path: String, candles_override: Option<String>, strategy_override: Option<String>) -> Result<()> {
    info!("Starting backtest");

    let mut config = BacktestConfig::from_file(&config_path)?;
    info!(config = %config_path, "loaded configuration");

    if let Some(name) = strategy_override {
        info!(strategy = %name, "overriding strategy");
        config.strategy.name = name;
    }

    let candles_path = candles_override.unwrap_or_else(|| config.candles_path.clone());
    let candles = data::load_csv(&candles_path)?;
    info!(candles = candles.len(), path = %candles_path, "loaded candle series");

    let mut strategy = create_strategy(&config)?;

    let mut driver = BacktestDriver::new(&config);
    let report = driver.run(&candles, strategy.as_mut());

    print_summary(&config, &candles, &report);
    Ok(())
}

fn create_strategy(config: &BacktestConfig) -> Result<Box<dyn crypto_strategies::Strategy>> {
    match config.strategy.name.as_str() {
        "grid" => Ok(Box::new(GridStrategy::new(GridConfig {
            call_interval_secs: config.strategy.call_interval_secs,
            spacing_pct: config.strategy.grid_spacing_pct,
            levels: config.strategy.grid_levels,
            order_qty: config.strategy.order_qty,
        }))),
        other => bail!("unknown strategy: {other} (only \"grid\" is built in)"),
    }
}

fn print_summary(
    config: &BacktestConfig,
    candles: &[crypto_strategies::Candle],
    report: &crypto_strategies::report::BacktestReport,
) {
    let filled = report
        .order_events
        .iter()
        .filter(|e| e.order.action == OrderAction::Filled)
        .count();
    let partial = report
        .order_events
        .iter()
        .filter(|e| e.order.action == OrderAction::PartiallyFilled)
        .count();
    let canceled = report
        .order_events
        .iter()
        .filter(|e| e.order.action == OrderAction::Canceled)
        .count();
    let liquidations = report
        .order_events
        .iter()
        .filter(|e| e.order.action == OrderAction::Liquidation)
        .count();

    println!("\n{}", "=".repeat(60));
    println!("BACKTEST RESULTS");
    println!("{}", "=".repeat(60));
    println!("Symbol:             {}", config.symbol);
    println!("Candles Processed:  {}", candles.len());
    println!("Halted (Liquidated):{:>6}", report.liquidated);
    println!("Initial Balance:    {:.2}", config.initial_balance);
    println!(
        "Final Balance:      {:.2}",
        report.final_balance().unwrap_or(config.initial_balance)
    );
    println!(
        "Net Result:         {:.2}",
        report.final_balance().unwrap_or(config.initial_balance) - config.initial_balance
    );
    println!("Realized PnL:       {:.2}", report.realized_pnl);
    println!("Total Fees Paid:    {:.2}", report.total_fees);
    println!("{}", "-".repeat(60));
    println!("Filled Orders:      {}", filled);
    println!("Partial Fills:      {}", partial);
    println!("Canceled Orders:    {}", canceled);
    println!("Liquidation Events: {}", liquidations);
    println!("{}", "=".repeat(60));
}
