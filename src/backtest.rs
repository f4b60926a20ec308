//! Backtest driver: iterates candles through a [`SimulatedExchange`],
//! buffers recent history into a rolling `price_list`, and invokes the
//! strategy once per `call_interval`, draining its queued order intents
//! back into the exchange.

use tracing::info;

use crate::config::BacktestConfig;
use crate::exchange::SimulatedExchange;
use crate::report::{AccountSnapshot, BacktestReport};
use crate::strategy::{Bot, OrderIntent, Strategy};
use crate::types::{Candle, Order, OrderId, OrderType};

/// Drives a [`SimulatedExchange`] candle-by-candle against a [`Strategy`].
pub struct BacktestDriver {
    exchange: SimulatedExchange,
    next_client_id: OrderId,
}

impl BacktestDriver {
    pub fn new(config: &BacktestConfig) -> Self {
        Self {
            exchange: SimulatedExchange::new(config.exchange_config(), config.initial_balance),
            next_client_id: 1,
        }
    }

    fn next_id(&mut self) -> OrderId {
        let id = self.next_client_id;
        self.next_client_id += 1;
        id
    }

    fn apply_intents(&mut self, intents: Vec<OrderIntent>) {
        for intent in intents {
            match intent {
                OrderIntent::Create {
                    position_side,
                    side,
                    order_type,
                    price,
                    qty,
                } => {
                    let id = self.next_id();
                    let timestamp = self.exchange.current_timestamp_ms();
                    let mut order = Order::new("", id, position_side, side, order_type, price, qty, timestamp);
                    if order_type == OrderType::Market {
                        order.price = 0.0;
                    }
                    self.exchange.submit_order(order);
                }
                OrderIntent::Cancel { position_side, client_id } => {
                    self.exchange.cancel_order(position_side, client_id);
                }
            }
        }
    }

    /// Runs the full candle series against `strategy`, returning the
    /// accumulated report. Stops early (without consuming the rest of
    /// `candles`) if the account is liquidated.
    pub fn run(&mut self, candles: &[Candle], strategy: &mut dyn Strategy) -> BacktestReport {
        let mut report = BacktestReport::new();
        let mut price_list: Vec<Candle> = Vec::new();
        let mut last_decision_ms = candles.first().map(|c| c.timestamp_ms).unwrap_or(0);

        info!(candles = candles.len(), "starting backtest run");

        for candle in candles {
            let can_continue = self.exchange.step(candle);

            for order in self.exchange.take_order_events() {
                report.record_order(candle.timestamp_ms, order);
            }

            for fill in self.exchange.take_fill_events() {
                report.record_fill(fill.fee_paid, fill.realized_pnl);
            }

            report.record_snapshot(AccountSnapshot {
                timestamp_ms: candle.timestamp_ms,
                balance: self.exchange.account().balance(),
                long: *self.exchange.account().long(),
                short: *self.exchange.account().short(),
            });

            if !can_continue {
                report.liquidated = true;
                info!(timestamp_ms = candle.timestamp_ms, "backtest halted: account liquidated");
                return report;
            }

            price_list.push(*candle);

            let call_interval_ms = (strategy.call_interval() * 1000.0) as i64;
            if candle.timestamp_ms - last_decision_ms >= call_interval_ms {
                last_decision_ms = candle.timestamp_ms;
                let mut bot = Bot::new(self.exchange.account());
                strategy.decide(&price_list, &mut bot);
                let intents = bot.into_intents();
                self.apply_intents(intents);
                price_list.clear();
            }
        }

        info!(final_balance = self.exchange.account().balance(), "backtest run complete");
        report
    }
}
