//! The strategy contract: a pure decision function invoked on a cadence,
//! plus the facade it uses to read account state and queue order intents.

use crate::account::Account;
use crate::types::{Candle, Order, OrderId, OrderType, PositionSide, Side};

/// An order-creation or order-cancellation request queued by a strategy
/// during a [`Strategy::decide`] call. The driver stamps `client_id` and
/// `timestamp_ms` before handing it to the exchange.
#[derive(Debug, Clone)]
pub enum OrderIntent {
    Create {
        position_side: PositionSide,
        side: Side,
        order_type: OrderType,
        price: f64,
        qty: f64,
    },
    Cancel {
        position_side: PositionSide,
        client_id: OrderId,
    },
}

impl OrderIntent {
    pub fn limit(position_side: PositionSide, side: Side, price: f64, qty: f64) -> Self {
        OrderIntent::Create {
            position_side,
            side,
            order_type: OrderType::Limit,
            price,
            qty,
        }
    }

    pub fn market(position_side: PositionSide, side: Side, qty: f64) -> Self {
        OrderIntent::Create {
            position_side,
            side,
            order_type: OrderType::Market,
            price: 0.0,
            qty,
        }
    }

    pub fn cancel(position_side: PositionSide, client_id: OrderId) -> Self {
        OrderIntent::Cancel { position_side, client_id }
    }
}

/// Read-only view of account state plus the order-intent sink, passed to
/// [`Strategy::decide`]. Strategies never mutate the account directly — all
/// effects flow through `create_orders`/`cancel_orders` and are only
/// applied by the exchange on a later candle, honoring admission latency.
pub struct Bot<'a> {
    account: &'a Account,
    intents: Vec<OrderIntent>,
}

impl<'a> Bot<'a> {
    pub fn new(account: &'a Account) -> Self {
        Self {
            account,
            intents: Vec::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.account.balance()
    }

    pub fn long(&self) -> &crate::types::Position {
        self.account.long()
    }

    pub fn short(&self) -> &crate::types::Position {
        self.account.short()
    }

    pub fn open_long_orders(&self) -> &[Order] {
        self.account.open_orders().long()
    }

    pub fn open_short_orders(&self) -> &[Order] {
        self.account.open_orders().short()
    }

    pub fn create_orders(&mut self, intents: impl IntoIterator<Item = OrderIntent>) {
        self.intents.extend(intents);
    }

    pub fn cancel_orders(&mut self, cancels: impl IntoIterator<Item = (PositionSide, OrderId)>) {
        self.intents
            .extend(cancels.into_iter().map(|(side, id)| OrderIntent::cancel(side, id)));
    }

    pub fn into_intents(self) -> Vec<OrderIntent> {
        self.intents
    }
}

/// A trading strategy: a pure function of recent price history and current
/// account state to a batch of order intents, invoked once per
/// `call_interval`.
pub trait Strategy {
    /// Seconds between invocations of [`Strategy::decide`]. The driver
    /// buffers candles and calls `decide` once this much wall-clock time
    /// has elapsed since the last call.
    fn call_interval(&self) -> f64;

    /// Called with the candles observed since the previous call (oldest
    /// first) and a [`Bot`] handle for reading state and queuing orders.
    fn decide(&mut self, price_list: &[Candle], bot: &mut Bot<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;

    #[test]
    fn bot_collects_queued_intents() {
        let account = Account::new(1000.0, 10.0);
        let mut bot = Bot::new(&account);
        bot.create_orders([OrderIntent::limit(PositionSide::Long, Side::Buy, 100.0, 1.0)]);
        bot.cancel_orders([(PositionSide::Short, 7)]);
        let intents = bot.into_intents();
        assert_eq!(intents.len(), 2);
    }
}
