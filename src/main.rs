//! Candle-driven perpetual-futures exchange simulator - command-line entry
//! point.
//!
//! This binary provides two subcommands:
//! - backtest: run a strategy against a historical candle series
//! - demo-strategy: run the built-in grid strategy against synthetic
//!   candles, with no config file or market data needed

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "crypto-strategies")]
#[command(about = "Deterministic candle-driven perpetual-futures exchange simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a strategy backtest against a historical candle series
    Backtest {
        /// Path to the backtest configuration JSON file
        #[arg(short, long, default_value = "configs/backtest.json")]
        config: String,

        /// Path to the candle CSV file (overrides the config's candles_path)
        #[arg(long)]
        candles: Option<String>,

        /// Strategy name (overrides config file); only "grid" is built in
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// Run the built-in grid strategy against synthetic candles
    DemoStrategy {
        /// Number of synthetic hourly candles to generate
        #[arg(short = 'n', long, default_value = "500")]
        candles: usize,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Backtest { .. } => "backtest",
        Commands::DemoStrategy { .. } => "demo-strategy",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Backtest {
            config,
            candles,
            strategy,
        } => commands::backtest::run(config, candles, strategy),
        Commands::DemoStrategy { candles } => commands::demo_strategy::run(candles),
    }
}
