//! Backtest observability: a plain record of every order transition and a
//! periodic account snapshot, assembled into a [`BacktestReport`] at the
//! end of a run.
//!
//! This intentionally stops short of the Sharpe/Calmar/drawdown suite a
//! spot-equity backtester reports — those metrics assume a single,
//! unleveraged position and don't carry over cleanly to a bilateral
//! cross-margined perpetual book. A host application can derive them from
//! the `AccountSnapshot` series this report carries.

use serde::{Deserialize, Serialize};

use crate::types::{Order, OrderAction, Position};

/// One order lifecycle transition observed during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub timestamp_ms: i64,
    pub order: Order,
}

/// Account state at a point in the run, recorded once per candle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub timestamp_ms: i64,
    pub balance: f64,
    pub long: Position,
    pub short: Position,
}

/// The full record of a backtest run: every order event in order, an
/// account snapshot per candle, whether the run completed normally or
/// halted on liquidation, and the cumulative fee/pnl totals realized across
/// every fill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestReport {
    pub order_events: Vec<OrderEvent>,
    pub snapshots: Vec<AccountSnapshot>,
    pub liquidated: bool,
    /// Sum of every fill's fee, as a positive figure (balance spent on fees).
    pub total_fees: f64,
    /// Sum of every fill's realized pnl (position-reducing fills only;
    /// position-opening fills contribute zero).
    pub realized_pnl: f64,
}

impl BacktestReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_order(&mut self, timestamp_ms: i64, order: Order) {
        self.order_events.push(OrderEvent { timestamp_ms, order });
    }

    /// Accumulates one fill's fee/pnl delta into the run-wide totals.
    /// `fee_paid` is the signed balance delta from the fee (`<= 0`);
    /// `total_fees` tracks its magnitude.
    pub fn record_fill(&mut self, fee_paid: f64, realized_pnl: f64) {
        self.total_fees += fee_paid.abs();
        self.realized_pnl += realized_pnl;
    }

    pub fn record_snapshot(&mut self, snapshot: AccountSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn fills(&self) -> impl Iterator<Item = &OrderEvent> {
        self.order_events
            .iter()
            .filter(|e| matches!(e.order.action, OrderAction::Filled | OrderAction::PartiallyFilled))
    }

    pub fn final_balance(&self) -> Option<f64> {
        self.snapshots.last().map(|s| s.balance)
    }

    pub fn total_trades(&self) -> usize {
        self.order_events
            .iter()
            .filter(|e| e.order.action == OrderAction::Filled)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderType, PositionSide, Side};

    #[test]
    fn final_balance_reads_the_last_snapshot() {
        let mut report = BacktestReport::new();
        report.record_snapshot(AccountSnapshot {
            timestamp_ms: 0,
            balance: 1000.0,
            long: Position::flat(PositionSide::Long, 10.0),
            short: Position::flat(PositionSide::Short, 10.0),
        });
        report.record_snapshot(AccountSnapshot {
            timestamp_ms: 1,
            balance: 950.0,
            long: Position::flat(PositionSide::Long, 10.0),
            short: Position::flat(PositionSide::Short, 10.0),
        });
        assert_eq!(report.final_balance(), Some(950.0));
    }

    #[test]
    fn record_fill_accumulates_fee_magnitude_and_signed_pnl() {
        let mut report = BacktestReport::new();
        report.record_fill(-0.02, 0.0);
        report.record_fill(-0.01, 10.0);
        report.record_fill(-0.01, -4.0);
        assert_eq!(report.total_fees, 0.04);
        assert_eq!(report.realized_pnl, 6.0);
    }

    #[test]
    fn total_trades_counts_only_full_fills() {
        let mut report = BacktestReport::new();
        let mut order = Order::new("BTCUSDT", 1, PositionSide::Long, Side::Buy, OrderType::Limit, 100.0, 1.0, 0);
        order.action = OrderAction::PartiallyFilled;
        report.record_order(0, order.clone());
        order.action = OrderAction::Filled;
        report.record_order(1, order);
        assert_eq!(report.total_trades(), 1);
    }
}
