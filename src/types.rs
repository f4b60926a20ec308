//! Core data types shared across the simulator: candles, sides, order
//! lifecycle states, orders, and positions.

use serde::{Deserialize, Serialize};

/// One OHLCV bar. `timestamp_ms` is carried alongside the price/volume
/// fields rather than inside them, matching the market-data table's column
/// layout (timestamp, open, high, low, close, volume).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Mean of open/high/low/close, the deterministic proxy this simulator
    /// uses for an intra-candle market-order fill price.
    pub fn ohlc_mean(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }
}

/// Trade direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Which side of the account's bilateral position an order/position belongs
/// to. A symbol always has exactly one `Long` and one `Short` position,
/// either of which may be empty (`qty == 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

/// Execution semantics of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// Always executes; fills at the candle's OHLC mean, taker fee.
    Market,
    /// Executes once price crosses the limit price, maker fee.
    Limit,
    /// Take-profit: executes like a limit order on the closing side.
    Tp,
    /// Stop-loss: executes like a limit order on the opening side.
    Sl,
}

/// Lifecycle state of an order. `Calculated`/`Liquidation` mark a synthetic
/// order the engine itself emitted (a liquidation close), not one a
/// strategy submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderAction {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Calculated,
    Liquidation,
}

impl OrderAction {
    /// Terminal actions remove the order from the open book.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderAction::Filled | OrderAction::Canceled | OrderAction::Liquidation
        )
    }
}

/// Identity used for order-book append/delete and for matching a cancel
/// intent to its live order: `(position_side, client_id)`. `client_id` is
/// assigned by the driver when an order is created, not by the strategy.
pub type OrderId = u64;

/// A simulated order. Identity fields (`symbol`, `client_id`,
/// `position_side`, `side`, `order_type`) are set once at creation and
/// never mutated; `price`, `stop_price`, `qty`, `action`, `timestamp` are
/// mutated in place by the exchange as the order's lifecycle advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub client_id: OrderId,
    pub position_side: PositionSide,
    pub side: Side,
    pub order_type: OrderType,

    pub price: f64,
    pub stop_price: Option<f64>,
    pub qty: f64,
    pub action: OrderAction,
    pub timestamp_ms: i64,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        client_id: OrderId,
        position_side: PositionSide,
        side: Side,
        order_type: OrderType,
        price: f64,
        qty: f64,
        timestamp_ms: i64,
    ) -> Self {
        debug_assert!(qty >= 0.0, "order qty must be non-negative");
        debug_assert!(price > 0.0, "order price must be positive");
        Self {
            symbol: symbol.into(),
            client_id,
            position_side,
            side,
            order_type,
            price,
            stop_price: None,
            qty,
            action: OrderAction::New,
            timestamp_ms,
        }
    }

    pub fn identity(&self) -> (PositionSide, OrderId) {
        (self.position_side, self.client_id)
    }
}

/// One side (long or short) of the account's bilateral position in a
/// single symbol. A flat position has `qty == 0.0`, `avg_price == 0.0`,
/// `liquidation_price == 0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub qty: f64,
    pub avg_price: f64,
    pub liquidation_price: f64,
    pub leverage: f64,
    pub position_side: PositionSide,
}

impl Position {
    pub fn flat(position_side: PositionSide, leverage: f64) -> Self {
        Self {
            qty: 0.0,
            avg_price: 0.0,
            liquidation_price: 0.0,
            leverage,
            position_side,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.qty == 0.0
    }
}
