//! A single tick of the order book.

use rust_decimal::Decimal;
use tickmatch_types::{Amount, Order};

/// All orders resting at one lattice price, in insertion order.
///
/// Insertion order is matching priority: the front of the list fills
/// first, and the remainder of a proportional distribution is handed out
/// front to back.
#[derive(Debug, Clone)]
pub struct TickLevel<O> {
    /// The lattice price of this tick.
    pub price: Decimal,
    /// Orders in priority order (front = first in = first filled).
    pub orders: Vec<O>,
}

impl<O: Order> TickLevel<O> {
    #[must_use]
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: Vec::new(),
        }
    }

    /// Appends an order at the lowest priority of this tick.
    pub fn push(&mut self, order: O) {
        self.orders.push(order);
    }

    /// Total open amount across the orders at this tick.
    #[must_use]
    pub fn total_open_amount(&self) -> Amount {
        self.orders.iter().map(Order::open_amount).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tickmatch_types::{BatchId, BatchOrder, Direction, OrderId};

    use super::*;

    fn order(id: u64, amount: Amount) -> BatchOrder {
        BatchOrder::user_limit(
            OrderId(id),
            BatchId(1),
            Direction::Buy,
            Decimal::new(100, 0),
            amount,
        )
    }

    #[test]
    fn keeps_insertion_order() {
        let mut level = TickLevel::new(Decimal::new(100, 0));
        level.push(order(1, 10));
        level.push(order(2, 20));
        assert_eq!(level.len(), 2);
        assert_eq!(level.orders[0].id, OrderId(1));
        assert_eq!(level.orders[1].id, OrderId(2));
    }

    #[test]
    fn total_open_amount_sums_open_not_original() {
        let mut level = TickLevel::new(Decimal::new(100, 0));
        let mut partly_filled = order(1, 10);
        partly_filled.open_amount = 4;
        level.push(partly_filled);
        level.push(order(2, 20));
        assert_eq!(level.total_open_amount(), 24);
    }

    #[test]
    fn empty_level() {
        let level: TickLevel<BatchOrder> = TickLevel::new(Decimal::ONE);
        assert!(level.is_empty());
        assert_eq!(level.total_open_amount(), 0);
    }
}
