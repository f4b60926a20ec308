//! A laddered grid strategy: on each call, lays a fixed number of long
//! limit-buy rungs below the last close and mirrors them with limit-sell
//! rungs above it. Serves as the worked example of the [`Strategy`]
//! contract; it is deliberately simple rather than competitive.

use crate::strategy::{Bot, OrderIntent, Strategy};
use crate::types::{Candle, PositionSide, Side};

#[derive(Debug, Clone)]
pub struct GridConfig {
    pub call_interval_secs: f64,
    pub spacing_pct: f64,
    pub levels: u32,
    pub order_qty: f64,
}

/// Places `levels` long-buy rungs spaced `spacing_pct` apart below the most
/// recent close, and the mirrored short-sell rungs above it. Never cancels
/// a standing rung — a production strategy would reconcile against
/// `bot.open_long_orders()`/`open_short_orders()` before laying new ones.
pub struct GridStrategy {
    config: GridConfig,
}

impl GridStrategy {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }
}

impl Strategy for GridStrategy {
    fn call_interval(&self) -> f64 {
        self.config.call_interval_secs
    }

    fn decide(&mut self, price_list: &[Candle], bot: &mut Bot<'_>) {
        let Some(last) = price_list.last() else {
            return;
        };

        if !bot.open_long_orders().is_empty() || !bot.open_short_orders().is_empty() {
            return;
        }

        let mut intents = Vec::new();
        for level in 1..=self.config.levels {
            let offset = self.config.spacing_pct * level as f64;
            let buy_price = last.close * (1.0 - offset);
            let sell_price = last.close * (1.0 + offset);

            intents.push(OrderIntent::limit(
                PositionSide::Long,
                Side::Buy,
                buy_price,
                self.config.order_qty,
            ));
            intents.push(OrderIntent::limit(
                PositionSide::Short,
                Side::Sell,
                sell_price,
                self.config.order_qty,
            ));
        }
        bot.create_orders(intents);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;

    fn config() -> GridConfig {
        GridConfig {
            call_interval_secs: 3600.0,
            spacing_pct: 0.01,
            levels: 3,
            order_qty: 0.01,
        }
    }

    #[test]
    fn lays_one_rung_pair_per_level() {
        let mut strategy = GridStrategy::new(config());
        let account = Account::new(10_000.0, 10.0);
        let mut bot = Bot::new(&account);
        let candles = vec![Candle::new(0, 100.0, 100.0, 100.0, 100.0, 1.0)];
        strategy.decide(&candles, &mut bot);
        assert_eq!(bot.into_intents().len(), 6);
    }

    #[test]
    fn does_nothing_with_no_candles() {
        let mut strategy = GridStrategy::new(config());
        let account = Account::new(10_000.0, 10.0);
        let mut bot = Bot::new(&account);
        strategy.decide(&[], &mut bot);
        assert_eq!(bot.into_intents().len(), 0);
    }
}
