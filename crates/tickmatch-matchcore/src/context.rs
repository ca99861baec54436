//! The fill journal matching writes into.
//!
//! Nothing mutates an order while matching runs: every hypothetical fill
//! is recorded here, keyed by [`OrderId`], and applied to the orders in a
//! single commit pass afterwards (see
//! [`apply_match_results`](crate::apply_match_results)). Aborting a batch
//! before commit therefore needs no rollback at all.
//!
//! The journal is a `BTreeMap`, so iteration order is deterministic and
//! the whole context serializes cleanly for debugging and replay.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tickmatch_types::{Amount, Order, OrderId};

/// One fill of `amount` base units at `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub amount: Amount,
    pub price: Decimal,
}

/// Journal entry for a single order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Base units still unmatched; starts at the order's full amount.
    pub open_amount: Amount,
    /// Fills in the order they were recorded.
    pub match_records: Vec<MatchRecord>,
}

/// Journal of hypothetical fills for one matching invocation.
///
/// An absent key means the order is untouched
/// (`open_amount == order.amount()`). Records are append-only and
/// `open_amount` only ever decreases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchContext {
    results: BTreeMap<OrderId, MatchResult>,
}

impl MatchContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fill of `amount` at `price` against `order`.
    ///
    /// # Panics
    /// Matching more than the order's journalled open amount is a fatal
    /// engine fault: the journal would no longer describe a realizable
    /// set of fills.
    pub fn match_order<O: Order>(&mut self, order: &O, amount: Amount, price: Decimal) {
        let open = self.open_amount(order);
        assert!(
            amount <= open,
            "cannot match more than open amount on {}: {amount} > {open}",
            order.id()
        );
        let result = self
            .results
            .entry(order.id())
            .or_insert_with(|| MatchResult {
                open_amount: order.amount(),
                match_records: Vec::new(),
            });
        result.open_amount -= amount;
        result.match_records.push(MatchRecord { amount, price });
    }

    /// Fills the order's whole open amount at `price`; no-op when the
    /// order has nothing open.
    pub fn match_order_full<O: Order>(&mut self, order: &O, price: Decimal) {
        let open = self.open_amount(order);
        if open > 0 {
            self.match_order(order, open, price);
        }
    }

    /// [`match_order_full`](Self::match_order_full) over a list.
    pub fn match_orders_full<O: Order>(&mut self, orders: &[O], price: Decimal) {
        for order in orders {
            self.match_order_full(order, price);
        }
    }

    /// The order's open amount as seen through the journal.
    #[must_use]
    pub fn open_amount<O: Order>(&self, order: &O) -> Amount {
        self.results
            .get(&order.id())
            .map_or_else(|| order.amount(), |r| r.open_amount)
    }

    /// Base units matched against the order so far.
    #[must_use]
    pub fn matched_amount<O: Order>(&self, order: &O) -> Amount {
        self.results
            .get(&order.id())
            .map_or(0, |r| order.amount() - r.open_amount)
    }

    /// Sum of open amounts over a list of orders.
    #[must_use]
    pub fn total_open_amount<O: Order>(&self, orders: &[O]) -> Amount {
        orders.iter().map(|o| self.open_amount(o)).sum()
    }

    /// Journal entry for an order, if it was touched.
    #[must_use]
    pub fn result(&self, id: OrderId) -> Option<&MatchResult> {
        self.results.get(&id)
    }

    /// All journal entries in ascending order-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&OrderId, &MatchResult)> {
        self.results.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }
}

#[cfg(test)]
mod tests {
    use tickmatch_types::{BatchId, BatchOrder, Direction};

    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sell(id: u64, amount: Amount) -> BatchOrder {
        BatchOrder::user_limit(OrderId(id), BatchId(1), Direction::Sell, dec("10"), amount)
    }

    #[test]
    fn untouched_order_is_fully_open() {
        let ctx = MatchContext::new();
        let order = sell(1, 100);
        assert_eq!(ctx.open_amount(&order), 100);
        assert_eq!(ctx.matched_amount(&order), 0);
        assert!(ctx.result(OrderId(1)).is_none());
    }

    #[test]
    fn match_order_decrements_open_and_appends_record() {
        let mut ctx = MatchContext::new();
        let order = sell(1, 100);
        ctx.match_order(&order, 30, dec("10"));
        ctx.match_order(&order, 20, dec("11"));
        assert_eq!(ctx.open_amount(&order), 50);
        assert_eq!(ctx.matched_amount(&order), 50);
        let result = ctx.result(OrderId(1)).unwrap();
        assert_eq!(
            result.match_records,
            vec![
                MatchRecord { amount: 30, price: dec("10") },
                MatchRecord { amount: 20, price: dec("11") },
            ]
        );
    }

    #[test]
    fn open_amount_never_increases() {
        let mut ctx = MatchContext::new();
        let order = sell(1, 100);
        let mut last = ctx.open_amount(&order);
        for amount in [40, 0, 25, 35] {
            ctx.match_order(&order, amount, dec("10"));
            let open = ctx.open_amount(&order);
            assert!(open <= last);
            last = open;
        }
        assert_eq!(last, 0);
    }

    #[test]
    #[should_panic(expected = "cannot match more than open amount")]
    fn over_match_is_fatal() {
        let mut ctx = MatchContext::new();
        let order = sell(1, 10);
        ctx.match_order(&order, 11, dec("10"));
    }

    #[test]
    fn match_order_full_is_noop_when_nothing_open() {
        let mut ctx = MatchContext::new();
        let order = sell(1, 10);
        ctx.match_order_full(&order, dec("10"));
        ctx.match_order_full(&order, dec("10"));
        let result = ctx.result(OrderId(1)).unwrap();
        assert_eq!(result.match_records.len(), 1);
        assert_eq!(result.open_amount, 0);
    }

    #[test]
    fn total_open_amount_over_list() {
        let mut ctx = MatchContext::new();
        let orders = vec![sell(1, 10), sell(2, 20), sell(3, 30)];
        ctx.match_order(&orders[1], 5, dec("10"));
        assert_eq!(ctx.total_open_amount(&orders), 55);
    }

    #[test]
    fn journal_serializes_for_replay() {
        let mut ctx = MatchContext::new();
        let order = sell(7, 100);
        ctx.match_order(&order, 40, dec("10"));
        let json = serde_json::to_string(&ctx).unwrap();
        let back: MatchContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }
}
