//! Performance benchmarks for the simulated exchange and backtest driver.
//!
//! Run with: `cargo bench`
//! View results: `open target/criterion/report/index.html`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use crypto_strategies::exchange::{ExchangeConfig, SimulatedExchange};
use crypto_strategies::strategies::grid::{GridConfig, GridStrategy};
use crypto_strategies::strategy::{Bot, OrderIntent, Strategy};
use crypto_strategies::types::{Candle, PositionSide, Side};
use crypto_strategies::{BacktestConfig, BacktestDriver};

fn exchange_config() -> ExchangeConfig {
    ExchangeConfig {
        quantity_step: 0.001,
        price_step: 0.01,
        leverage: 10.0,
        maker_fee: 0.0002,
        taker_fee: 0.0005,
        latency_ms: 500,
    }
}

/// A synthetic, deterministic random-walk candle series (no RNG crate
/// needed: a fixed-seed linear congruential step is enough for a stable
/// benchmark input).
fn synthetic_candles(count: usize) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(count);
    let mut price = 30_000.0_f64;
    let mut seed = 0x2545F4914F6CDD1Du64;
    for i in 0..count {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let drift = ((seed >> 33) as f64 / u32::MAX as f64 - 0.5) * 20.0;
        price = (price + drift).max(1.0);
        let high = price + 5.0;
        let low = (price - 5.0).max(1.0);
        candles.push(Candle::new((i as i64) * 60_000, price, high, low, price + drift * 0.2, 50.0));
    }
    candles
}

fn bench_exchange_step(c: &mut Criterion) {
    let candles = synthetic_candles(10_000);

    let mut group = c.benchmark_group("exchange step");
    group.throughput(Throughput::Elements(candles.len() as u64));
    group.bench_function("step 10k candles, no orders", |b| {
        b.iter(|| {
            let mut exchange = SimulatedExchange::new(exchange_config(), 10_000.0);
            for candle in &candles {
                black_box(exchange.step(candle));
            }
        });
    });
    group.finish();
}

fn bench_exchange_step_with_standing_orders(c: &mut Criterion) {
    let candles = synthetic_candles(10_000);

    let mut group = c.benchmark_group("exchange step with orders");
    group.throughput(Throughput::Elements(candles.len() as u64));
    group.bench_function("step 10k candles, laddered orders resubmitted every 100", |b| {
        b.iter(|| {
            let mut exchange = SimulatedExchange::new(exchange_config(), 10_000.0);
            let mut next_id = 1u64;
            for (i, candle) in candles.iter().enumerate() {
                exchange.step(candle);
                if i % 100 == 0 {
                    for level in 1..=3u32 {
                        let offset = 0.01 * level as f64;
                        let order = crypto_strategies::types::Order::new(
                            "BTCUSDT",
                            next_id,
                            PositionSide::Long,
                            Side::Buy,
                            crypto_strategies::types::OrderType::Limit,
                            candle.close * (1.0 - offset),
                            0.01,
                            candle.timestamp_ms,
                        );
                        next_id += 1;
                        exchange.submit_order(order);
                    }
                }
            }
            black_box(exchange.account().balance());
        });
    });
    group.finish();
}

fn bench_full_backtest(c: &mut Criterion) {
    let candles = synthetic_candles(5_000);
    let config = BacktestConfig::default();

    let mut group = c.benchmark_group("backtest driver");
    group.throughput(Throughput::Elements(candles.len() as u64));
    group.bench_function("grid strategy over 5k candles", |b| {
        b.iter(|| {
            let mut driver = BacktestDriver::new(&config);
            let mut strategy = GridStrategy::new(GridConfig {
                call_interval_secs: config.strategy.call_interval_secs,
                spacing_pct: config.strategy.grid_spacing_pct,
                levels: config.strategy.grid_levels,
                order_qty: config.strategy.order_qty,
            });
            black_box(driver.run(&candles, &mut strategy));
        });
    });
    group.finish();
}

struct NoOpStrategy;

impl Strategy for NoOpStrategy {
    fn call_interval(&self) -> f64 {
        3600.0
    }

    fn decide(&mut self, _price_list: &[Candle], bot: &mut Bot<'_>) {
        bot.create_orders(std::iter::empty::<OrderIntent>());
    }
}

fn bench_bot_facade_overhead(c: &mut Criterion) {
    let candles = synthetic_candles(5_000);
    let config = BacktestConfig::default();

    c.bench_function("backtest driver, strategy that never trades", |b| {
        b.iter(|| {
            let mut driver = BacktestDriver::new(&config);
            let mut strategy = NoOpStrategy;
            black_box(driver.run(&candles, &mut strategy));
        });
    });
}

criterion_group!(
    benches,
    bench_exchange_step,
    bench_exchange_step_with_standing_orders,
    bench_full_backtest,
    bench_bot_facade_overhead
);
criterion_main!(benches);
