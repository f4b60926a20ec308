//! Account state: balance plus one long and one short position per symbol,
//! mutated only through the two update contracts the exchange step drives.

use crate::orderbook::OrderList;
use crate::types::{Order, OrderAction, Position, PositionSide};

/// The fee and realized-pnl delta of a single match, recorded alongside the
/// order event it accompanies so a caller can accumulate run-wide totals
/// without re-deriving them from order state (which no longer carries the
/// fill price once an order has closed).
#[derive(Debug, Clone, Copy, Default)]
pub struct FillDelta {
    /// Balance delta from fees, always `<= 0`.
    pub fee_paid: f64,
    /// Realized pnl recognized by this fill, `0.0` for a position-opening
    /// fill (realized pnl only arises on a reduction).
    pub realized_pnl: f64,
}

/// A single symbol's bilateral account state: balance, the long position,
/// the short position, and their open orders.
#[derive(Debug, Clone)]
pub struct Account {
    balance: f64,
    long: Position,
    short: Position,
    open_orders: OrderList,
    order_events: Vec<Order>,
    fill_events: Vec<FillDelta>,
}

impl Account {
    pub fn new(initial_balance: f64, leverage: f64) -> Self {
        Self {
            balance: initial_balance,
            long: Position::flat(PositionSide::Long, leverage),
            short: Position::flat(PositionSide::Short, leverage),
            open_orders: OrderList::new(),
            order_events: Vec::new(),
            fill_events: Vec::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn long(&self) -> &Position {
        &self.long
    }

    pub fn short(&self) -> &Position {
        &self.short
    }

    pub fn open_orders(&self) -> &OrderList {
        &self.open_orders
    }

    pub fn open_orders_mut(&mut self) -> &mut OrderList {
        &mut self.open_orders
    }

    /// Atomically replaces balance and both positions. Callers pass the
    /// full post-fill state; there is no partial-update form.
    pub fn handle_account_update(&mut self, new_balance: f64, new_long: Position, new_short: Position) {
        debug_assert_eq!(new_long.position_side, PositionSide::Long);
        debug_assert_eq!(new_short.position_side, PositionSide::Short);
        self.balance = new_balance;
        self.long = new_long;
        self.short = new_short;
    }

    /// Drains every order transition observed since the last call. This is
    /// the in-process callback channel spec §6 describes: the driver polls
    /// it once per candle to assemble a [`crate::report::BacktestReport`].
    pub fn drain_order_events(&mut self) -> Vec<Order> {
        std::mem::take(&mut self.order_events)
    }

    /// Records the fee and realized-pnl delta of a match. Called by the
    /// exchange step alongside the [`Account::handle_order_update`] for the
    /// same fill.
    pub fn record_fill(&mut self, fee_paid: f64, realized_pnl: f64) {
        self.fill_events.push(FillDelta { fee_paid, realized_pnl });
    }

    /// Drains every fill delta observed since the last call, mirroring
    /// [`Account::drain_order_events`].
    pub fn drain_fill_events(&mut self) -> Vec<FillDelta> {
        std::mem::take(&mut self.fill_events)
    }

    /// Records an order's lifecycle transition and forwards the effect to
    /// the order book: append on `New`, remove on a terminal action,
    /// in-place quantity update on `PartiallyFilled`.
    pub fn handle_order_update(&mut self, order: Order) {
        self.order_events.push(order.clone());
        match order.action {
            OrderAction::New => match order.position_side {
                PositionSide::Long => self.open_orders.append_long(order),
                PositionSide::Short => self.open_orders.append_short(order),
            },
            OrderAction::PartiallyFilled => match order.position_side {
                PositionSide::Long => self.open_orders.update_long_qty(order.client_id, order.qty),
                PositionSide::Short => self.open_orders.update_short_qty(order.client_id, order.qty),
            },
            OrderAction::Filled | OrderAction::Canceled | OrderAction::Liquidation => {
                match order.position_side {
                    PositionSide::Long => self.open_orders.delete_long(&[order.client_id]),
                    PositionSide::Short => self.open_orders.delete_short(&[order.client_id]),
                }
            }
            OrderAction::Calculated => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderType, Side};

    #[test]
    fn new_account_starts_flat() {
        let acc = Account::new(1000.0, 10.0);
        assert_eq!(acc.balance(), 1000.0);
        assert!(acc.long().is_flat());
        assert!(acc.short().is_flat());
    }

    #[test]
    fn new_order_is_appended_to_the_matching_side() {
        let mut acc = Account::new(1000.0, 10.0);
        let order = Order::new("BTCUSDT", 1, PositionSide::Long, Side::Buy, OrderType::Limit, 100.0, 1.0, 0);
        acc.handle_order_update(order);
        assert_eq!(acc.open_orders().long().len(), 1);
        assert_eq!(acc.open_orders().short().len(), 0);
    }

    #[test]
    fn filled_order_is_removed_from_its_own_side() {
        let mut acc = Account::new(1000.0, 10.0);
        let mut order = Order::new("BTCUSDT", 1, PositionSide::Short, Side::Sell, OrderType::Limit, 100.0, 1.0, 0);
        acc.handle_order_update(order.clone());
        order.action = OrderAction::Filled;
        acc.handle_order_update(order);
        assert_eq!(acc.open_orders().short().len(), 0);
    }

    #[test]
    fn account_update_replaces_balance_and_both_positions() {
        let mut acc = Account::new(1000.0, 10.0);
        let new_long = Position {
            qty: 1.0,
            avg_price: 100.0,
            liquidation_price: 50.0,
            leverage: 10.0,
            position_side: PositionSide::Long,
        };
        acc.handle_account_update(900.0, new_long, Position::flat(PositionSide::Short, 10.0));
        assert_eq!(acc.balance(), 900.0);
        assert_eq!(acc.long().qty, 1.0);
        assert!(acc.short().is_flat());
    }

    #[test]
    fn order_events_drain_every_transition_and_then_empty() {
        let mut acc = Account::new(1000.0, 10.0);
        let mut order = Order::new("BTCUSDT", 1, PositionSide::Long, Side::Buy, OrderType::Limit, 100.0, 1.0, 0);
        acc.handle_order_update(order.clone());
        order.action = OrderAction::Filled;
        acc.handle_order_update(order);

        let events = acc.drain_order_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, OrderAction::New);
        assert_eq!(events[1].action, OrderAction::Filled);
        assert!(acc.drain_order_events().is_empty());
    }
}
