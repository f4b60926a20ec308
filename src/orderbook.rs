//! Order book state: two insertion-ordered sequences of open orders, one
//! per position side. This is not a price-time-priority limit order book —
//! identity (position side + client id) is the only lookup key, and
//! insertion order is preserved across appends and deletes.

use crate::types::{Order, OrderId, PositionSide};

/// Open orders for a single symbol, split by position side.
#[derive(Debug, Clone, Default)]
pub struct OrderList {
    long: Vec<Order>,
    short: Vec<Order>,
}

impl OrderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn long(&self) -> &[Order] {
        &self.long
    }

    pub fn short(&self) -> &[Order] {
        &self.short
    }

    pub fn append_long(&mut self, order: Order) {
        debug_assert_eq!(order.position_side, PositionSide::Long);
        self.long.push(order);
    }

    pub fn append_short(&mut self, order: Order) {
        debug_assert_eq!(order.position_side, PositionSide::Short);
        self.short.push(order);
    }

    /// Removes every long order whose client id is in `ids`, preserving the
    /// relative order of the remaining entries.
    pub fn delete_long(&mut self, ids: &[OrderId]) {
        self.long.retain(|o| !ids.contains(&o.client_id));
    }

    /// Removes every short order whose client id is in `ids`, preserving
    /// the relative order of the remaining entries.
    pub fn delete_short(&mut self, ids: &[OrderId]) {
        self.short.retain(|o| !ids.contains(&o.client_id));
    }

    /// Updates the quantity of a still-open long order in place (a partial
    /// fill). No-op if the id is not present.
    pub fn update_long_qty(&mut self, client_id: OrderId, new_qty: f64) {
        if let Some(o) = self.long.iter_mut().find(|o| o.client_id == client_id) {
            o.qty = new_qty;
        }
    }

    /// Updates the quantity of a still-open short order in place (a partial
    /// fill). No-op if the id is not present.
    pub fn update_short_qty(&mut self, client_id: OrderId, new_qty: f64) {
        if let Some(o) = self.short.iter_mut().find(|o| o.client_id == client_id) {
            o.qty = new_qty;
        }
    }

    pub fn find_by_identity(&self, position_side: PositionSide, client_id: OrderId) -> Option<&Order> {
        match position_side {
            PositionSide::Long => self.long.iter().find(|o| o.client_id == client_id),
            PositionSide::Short => self.short.iter().find(|o| o.client_id == client_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderType, Side};

    fn order(id: OrderId, side: PositionSide) -> Order {
        Order::new("BTCUSDT", id, side, Side::Buy, OrderType::Limit, 100.0, 1.0, 0)
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut list = OrderList::new();
        list.append_long(order(1, PositionSide::Long));
        list.append_long(order(2, PositionSide::Long));
        list.append_long(order(3, PositionSide::Long));
        let ids: Vec<_> = list.long().iter().map(|o| o.client_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn delete_long_removes_only_named_ids_and_keeps_order() {
        let mut list = OrderList::new();
        for id in 1..=4 {
            list.append_long(order(id, PositionSide::Long));
        }
        list.delete_long(&[2, 3]);
        let ids: Vec<_> = list.long().iter().map(|o| o.client_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn short_side_is_independent_of_long_side() {
        let mut list = OrderList::new();
        list.append_long(order(1, PositionSide::Long));
        list.append_short(order(1, PositionSide::Short));
        list.delete_short(&[1]);
        assert_eq!(list.short().len(), 0);
        assert_eq!(list.long().len(), 1);
    }

    #[test]
    fn partial_fill_updates_qty_in_place() {
        let mut list = OrderList::new();
        list.append_long(order(1, PositionSide::Long));
        list.update_long_qty(1, 0.5);
        assert_eq!(list.long()[0].qty, 0.5);
    }
}
