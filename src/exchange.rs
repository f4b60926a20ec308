//! Simulated exchange: advances account state one closed candle at a time.
//!
//! [`SimulatedExchange::step`] is the only mutator of [`Account`] state
//! during a run. It runs, in fixed order, a liquidation check, long-book
//! matching, short-book matching, and pending-order admission, mirroring
//! the control flow of the passivbot exchange step this crate reimplements
//! — including the two bug fixes noted in this repo's design ledger: the
//! short book is deleted from by its own `delete_short`, and a short fill
//! keeps `PositionSide::Short` rather than being mislabeled `Long`.

use tracing::{info, warn};

use crate::account::{Account, FillDelta};
use crate::math::{
    calculate_available_margin, calculate_bankruptcy_price, calculate_long_pnl,
    calculate_new_position_size_position_price, calculate_short_pnl, quantity_to_cost, round_down,
};
use crate::types::{Candle, Order, OrderAction, OrderId, OrderType, Position, PositionSide, Side};

/// Exchange parameters fixed for the lifetime of a run: contract step
/// sizes, fee schedule, and order-admission latency.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeConfig {
    pub quantity_step: f64,
    pub price_step: f64,
    pub leverage: f64,
    pub maker_fee: f64,
    pub taker_fee: f64,
    /// Milliseconds between order creation and exchange admission.
    pub latency_ms: i64,
}

/// An order waiting out admission latency before it becomes visible on the
/// book, or a cancel intent waiting to remove one.
#[derive(Debug, Clone)]
pub struct PendingOrder {
    pub order: Order,
    pub created_at_ms: i64,
}

/// Orders submitted by the strategy but not yet admitted to the open book.
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    long: Vec<PendingOrder>,
    short: Vec<PendingOrder>,
}

impl PendingQueue {
    pub fn push(&mut self, order: Order, created_at_ms: i64) {
        match order.position_side {
            PositionSide::Long => self.long.push(PendingOrder { order, created_at_ms }),
            PositionSide::Short => self.short.push(PendingOrder { order, created_at_ms }),
        }
    }

    pub fn len(&self) -> usize {
        self.long.len() + self.short.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drives [`Account`] state forward one candle at a time.
pub struct SimulatedExchange {
    config: ExchangeConfig,
    account: Account,
    pending: PendingQueue,
    current_timestamp_ms: i64,
}

impl SimulatedExchange {
    pub fn new(config: ExchangeConfig, initial_balance: f64) -> Self {
        Self {
            account: Account::new(initial_balance, config.leverage),
            config,
            pending: PendingQueue::default(),
            current_timestamp_ms: 0,
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Drains the order-lifecycle events observed during the most recent
    /// [`SimulatedExchange::step`] calls. The driver polls this once per
    /// candle; nothing else consumes it, so events accumulate across steps
    /// until drained.
    pub fn take_order_events(&mut self) -> Vec<Order> {
        self.account.drain_order_events()
    }

    /// Drains the fee/realized-pnl delta of every match observed during the
    /// most recent [`SimulatedExchange::step`] calls, one entry per fill, in
    /// the same order as the corresponding [`SimulatedExchange::take_order_events`]
    /// entries.
    pub fn take_fill_events(&mut self) -> Vec<FillDelta> {
        self.account.drain_fill_events()
    }

    pub fn current_timestamp_ms(&self) -> i64 {
        self.current_timestamp_ms
    }

    /// Queues a strategy-submitted order for admission-latency-gated entry
    /// onto the open book.
    pub fn submit_order(&mut self, mut order: Order) {
        order.timestamp_ms = self.current_timestamp_ms;
        order.action = OrderAction::New;
        self.pending.push(order, self.current_timestamp_ms);
    }

    /// Queues a cancel for an order already on the open book. Cancels skip
    /// the margin check at admission (§9 open question 3): they only ever
    /// free margin, never consume it.
    pub fn cancel_order(&mut self, position_side: PositionSide, client_id: OrderId) {
        if let Some(existing) = self.account.open_orders().find_by_identity(position_side, client_id) {
            let mut cancel = existing.clone();
            cancel.action = OrderAction::Canceled;
            cancel.timestamp_ms = self.current_timestamp_ms;
            self.pending.push(cancel, self.current_timestamp_ms);
        }
    }

    fn available_margin(&self, mark_price: f64) -> f64 {
        calculate_available_margin(
            self.account.balance(),
            self.account.long().qty,
            self.account.long().avg_price,
            self.account.short().qty,
            self.account.short().avg_price,
            mark_price,
            false,
            1.0,
            self.config.leverage,
        )
    }

    /// Advances the account by one closed candle. Returns `false` when the
    /// account was liquidated this step; the caller must stop the run.
    pub fn step(&mut self, candle: &Candle) -> bool {
        self.current_timestamp_ms = candle.timestamp_ms;

        if !self.check_liquidation(candle) {
            return false;
        }

        self.match_long_book(candle);
        self.match_short_book(candle);
        self.admit_pending(candle);
        true
    }

    fn check_liquidation(&mut self, candle: &Candle) -> bool {
        if self.available_margin(candle.close) > 0.0 {
            return true;
        }

        let long = *self.account.long();
        let short = *self.account.short();

        if long.qty != 0.0 {
            let liquidation = Order {
                symbol: String::new(),
                client_id: 0,
                position_side: PositionSide::Long,
                side: Side::Sell,
                order_type: OrderType::Market,
                price: candle.close,
                stop_price: None,
                qty: long.qty,
                action: OrderAction::Liquidation,
                timestamp_ms: self.current_timestamp_ms,
            };
            self.account.handle_order_update(liquidation);
            self.account
                .handle_account_update(0.0, Position::flat(PositionSide::Long, self.config.leverage), short);
        }

        let short = *self.account.short();
        if short.qty != 0.0 {
            let liquidation = Order {
                symbol: String::new(),
                client_id: 0,
                position_side: PositionSide::Short,
                side: Side::Sell,
                order_type: OrderType::Market,
                price: candle.close,
                stop_price: None,
                qty: short.qty,
                action: OrderAction::Liquidation,
                timestamp_ms: self.current_timestamp_ms,
            };
            self.account.handle_order_update(liquidation);
            self.account.handle_account_update(
                0.0,
                *self.account.long(),
                Position::flat(PositionSide::Short, self.config.leverage),
            );
        }

        warn!(timestamp_ms = self.current_timestamp_ms, "account liquidated");
        false
    }

    /// `true` if `order` (long-book semantics) would execute against this
    /// closed candle.
    fn long_triggers(order: &Order, candle: &Candle) -> bool {
        match order.order_type {
            OrderType::Market => true,
            OrderType::Limit | OrderType::Sl if order.side == Side::Buy => candle.low < order.price,
            OrderType::Limit | OrderType::Tp if order.side == Side::Sell => candle.high > order.price,
            _ => false,
        }
    }

    /// `true` if `order` (short-book semantics, mirrored trigger
    /// directions) would execute against this closed candle.
    fn short_triggers(order: &Order, candle: &Candle) -> bool {
        match order.order_type {
            OrderType::Market => true,
            OrderType::Limit | OrderType::Sl if order.side == Side::Buy => candle.high > order.price,
            OrderType::Limit | OrderType::Tp if order.side == Side::Sell => candle.low < order.price,
            _ => false,
        }
    }

    fn match_long_book(&mut self, candle: &Candle) {
        let triggered: Vec<Order> = self
            .account
            .open_orders()
            .long()
            .iter()
            .filter(|o| Self::long_triggers(o, candle))
            .cloned()
            .collect();

        let mut filled_ids = Vec::new();
        for order in &triggered {
            let mut filled = order.clone();
            if order.order_type == OrderType::Market {
                filled.price = round_down(candle.ohlc_mean(), self.config.price_step);
            }

            let fully_filled = candle.volume >= filled.qty;
            let fill_qty = if fully_filled { filled.qty } else { candle.volume };

            if fully_filled {
                filled.action = OrderAction::Filled;
                filled_ids.push(filled.client_id);
            } else {
                filled.action = OrderAction::PartiallyFilled;
                filled.qty -= candle.volume;
            }

            let fee_rate = if order.order_type == OrderType::Market {
                self.config.taker_fee
            } else {
                self.config.maker_fee
            };
            let fee_paid = -quantity_to_cost(fill_qty, filled.price, false, 1.0) * fee_rate.abs();

            let long = *self.account.long();
            let (pnl, delta_qty) = if order.side == Side::Sell {
                (
                    calculate_long_pnl(long.avg_price, filled.price, fill_qty, false, 1.0),
                    -fill_qty,
                )
            } else {
                (0.0, fill_qty)
            };

            let (new_qty, new_price) = calculate_new_position_size_position_price(
                long.qty,
                long.avg_price,
                delta_qty,
                filled.price,
                self.config.quantity_step,
            );
            let new_balance = self.account.balance() + fee_paid + pnl;
            let short = *self.account.short();
            let new_long = Position {
                qty: new_qty,
                avg_price: new_price,
                leverage: self.config.leverage,
                position_side: PositionSide::Long,
                liquidation_price: calculate_bankruptcy_price(
                    new_balance,
                    new_qty,
                    new_price,
                    short.qty,
                    short.avg_price,
                    false,
                    1.0,
                ),
            };

            self.account.record_fill(fee_paid, pnl);
            self.account.handle_order_update(filled);
            self.account.handle_account_update(new_balance, new_long, short);
        }

        self.account.open_orders_mut().delete_long(&filled_ids);
    }

    fn match_short_book(&mut self, candle: &Candle) {
        let triggered: Vec<Order> = self
            .account
            .open_orders()
            .short()
            .iter()
            .filter(|o| Self::short_triggers(o, candle))
            .cloned()
            .collect();

        let mut filled_ids = Vec::new();
        for order in &triggered {
            let mut filled = order.clone();
            if order.order_type == OrderType::Market {
                filled.price = round_down(candle.ohlc_mean(), self.config.price_step);
            }

            let fully_filled = candle.volume >= filled.qty;
            let fill_qty = if fully_filled { filled.qty } else { candle.volume };

            if fully_filled {
                filled.action = OrderAction::Filled;
                filled_ids.push(filled.client_id);
            } else {
                filled.action = OrderAction::PartiallyFilled;
                filled.qty -= candle.volume;
            }

            let fee_rate = if order.order_type == OrderType::Market {
                self.config.taker_fee
            } else {
                self.config.maker_fee
            };
            let fee_paid = -quantity_to_cost(fill_qty, filled.price, false, 1.0) * fee_rate.abs();

            let short = *self.account.short();
            // Mirrors the long book: SELL adds to short (opens/increases),
            // BUY reduces it (closes). Passivbot's own short-side branch
            // inverts this and realizes pnl on the wrong leg; this is the
            // fix called for in this repo's design notes.
            let (pnl, delta_qty) = if order.side == Side::Sell {
                (0.0, fill_qty)
            } else {
                (
                    calculate_short_pnl(short.avg_price, filled.price, fill_qty, false, 1.0),
                    -fill_qty,
                )
            };

            let (new_qty, new_price) = calculate_new_position_size_position_price(
                short.qty,
                short.avg_price,
                delta_qty,
                filled.price,
                self.config.quantity_step,
            );
            let new_balance = self.account.balance() + fee_paid + pnl;
            let long = *self.account.long();
            let new_short = Position {
                qty: new_qty,
                avg_price: new_price,
                leverage: self.config.leverage,
                position_side: PositionSide::Short,
                liquidation_price: calculate_bankruptcy_price(
                    new_balance,
                    long.qty,
                    long.avg_price,
                    new_qty,
                    new_price,
                    false,
                    1.0,
                ),
            };

            self.account.record_fill(fee_paid, pnl);
            self.account.handle_order_update(filled);
            self.account.handle_account_update(new_balance, long, new_short);
        }

        self.account.open_orders_mut().delete_short(&filled_ids);
    }

    fn admit_pending(&mut self, candle: &Candle) {
        let due_long: Vec<PendingOrder> = self
            .pending
            .long
            .iter()
            .filter(|p| p.created_at_ms + self.config.latency_ms <= self.current_timestamp_ms)
            .cloned()
            .collect();
        for pending in &due_long {
            let margin = self.available_margin(candle.close);
            if pending.order.qty * pending.order.price < margin || pending.order.action == OrderAction::Canceled {
                self.account.handle_order_update(pending.order.clone());
            }
        }
        self.pending
            .long
            .retain(|p| !due_long.iter().any(|d| d.order.client_id == p.order.client_id));

        let due_short: Vec<PendingOrder> = self
            .pending
            .short
            .iter()
            .filter(|p| p.created_at_ms + self.config.latency_ms <= self.current_timestamp_ms)
            .cloned()
            .collect();
        for pending in &due_short {
            let margin = self.available_margin(candle.close);
            if pending.order.qty * pending.order.price < margin || pending.order.action == OrderAction::Canceled {
                self.account.handle_order_update(pending.order.clone());
            }
        }
        self.pending
            .short
            .retain(|p| !due_short.iter().any(|d| d.order.client_id == p.order.client_id));

        if due_long.len() + due_short.len() > 0 {
            info!(
                timestamp_ms = self.current_timestamp_ms,
                admitted = due_long.len() + due_short.len(),
                "admitted pending orders"
            );
        }
    }
}
