//! Price-sorted buckets of orders, one book per matching invocation.
//!
//! Uses `BTreeMap` for tick ordering:
//! - **Buys**: `BTreeMap<Reverse<Decimal>, TickLevel>` -- highest price first
//! - **Sells**: `BTreeMap<Decimal, TickLevel>` -- lowest price first
//!
//! An auxiliary `HashMap<OrderId, (Direction, price)>` rejects duplicate
//! ids and locates orders for the commit pass. The book also implements
//! [`OrderSource`], so it can drive price discovery directly.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tickmatch_types::{Amount, Direction, Order, OrderId, Result, TickmatchError};

use crate::context::MatchContext;
use crate::distribution::distribute_order_amount;
use crate::level::TickLevel;
use crate::source::OrderSource;

/// Buy and sell orders grouped into price ticks.
#[derive(Debug)]
pub struct OrderBook<O> {
    buys: BTreeMap<Reverse<Decimal>, TickLevel<O>>,
    sells: BTreeMap<Decimal, TickLevel<O>>,
    index: HashMap<OrderId, (Direction, Decimal)>,
}

impl<O: Order> OrderBook<O> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buys: BTreeMap::new(),
            sells: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Inserts an order at its limit price, behind any orders already
    /// resting at that tick.
    ///
    /// # Errors
    /// `DuplicateOrder` for an id already in the book, `InvalidOrder` for
    /// a zero amount or non-positive price.
    pub fn add_order(&mut self, order: O) -> Result<()> {
        if order.amount() == 0 {
            return Err(TickmatchError::InvalidOrder {
                reason: format!("{} has zero amount", order.id()),
            });
        }
        if order.price() <= Decimal::ZERO {
            return Err(TickmatchError::InvalidOrder {
                reason: format!("{} has non-positive price {}", order.id(), order.price()),
            });
        }
        if self.index.contains_key(&order.id()) {
            return Err(TickmatchError::DuplicateOrder(order.id()));
        }

        let price = order.price();
        self.index.insert(order.id(), (order.direction(), price));
        match order.direction() {
            Direction::Buy => self
                .buys
                .entry(Reverse(price))
                .or_insert_with(|| TickLevel::new(price))
                .push(order),
            Direction::Sell => self
                .sells
                .entry(price)
                .or_insert_with(|| TickLevel::new(price))
                .push(order),
        }
        Ok(())
    }

    /// Inserts a batch of orders.
    ///
    /// # Errors
    /// Stops at the first order that fails [`add_order`](Self::add_order).
    pub fn add_orders(&mut self, orders: Vec<O>) -> Result<()> {
        for order in orders {
            self.add_order(order)?;
        }
        Ok(())
    }

    /// Number of orders in the book.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Buy ticks from best (highest) to worst.
    pub fn buy_levels(&self) -> impl Iterator<Item = &TickLevel<O>> {
        self.buys.values()
    }

    /// Sell ticks from best (lowest) to worst.
    pub fn sell_levels(&self) -> impl Iterator<Item = &TickLevel<O>> {
        self.sells.values()
    }

    /// Buy orders resting exactly at `price`, in priority order.
    #[must_use]
    pub fn buy_orders_at(&self, price: Decimal) -> &[O] {
        self.buys
            .get(&Reverse(price))
            .map_or(&[], |level| level.orders.as_slice())
    }

    /// Sell orders resting exactly at `price`, in priority order.
    #[must_use]
    pub fn sell_orders_at(&self, price: Decimal) -> &[O] {
        self.sells
            .get(&price)
            .map_or(&[], |level| level.orders.as_slice())
    }

    /// All orders, buy ticks (high to low) before sell ticks (low to high).
    pub fn orders(&self) -> impl Iterator<Item = &O> {
        self.buys
            .values()
            .flat_map(|level| level.orders.iter())
            .chain(self.sells.values().flat_map(|level| level.orders.iter()))
    }

    /// Mutable access to every order, for the commit pass.
    pub fn orders_mut(&mut self) -> impl Iterator<Item = &mut O> {
        self.buys
            .values_mut()
            .flat_map(|level| level.orders.iter_mut())
            .chain(
                self.sells
                    .values_mut()
                    .flat_map(|level| level.orders.iter_mut()),
            )
    }

    /// Opportunistic single-price match of everything crossed at `price`.
    ///
    /// Collects buy ticks at or above and sell ticks at or below the
    /// reference price, takes `min` of the two open totals, fully matches
    /// every tick before the marginal one and hands the marginal tick's
    /// remainder to [`distribute_order_amount`]. Fills are recorded in
    /// `ctx` only; no order is touched.
    ///
    /// The reference price is the caller's: the engine passes the
    /// discovered clearing price, hosts doing opportunistic matching pass
    /// their own last price or pool mid.
    ///
    /// Returns `true` if any volume was matched.
    pub fn instant_match(&self, ctx: &mut MatchContext, price: Decimal) -> bool {
        let mut buy_ticks = Vec::new();
        let mut buy_sums: Vec<Amount> = Vec::new();
        for level in self.buys.values() {
            if level.price < price {
                break;
            }
            let sum = buy_sums.last().copied().unwrap_or(0) + ctx.total_open_amount(&level.orders);
            buy_ticks.push(level);
            buy_sums.push(sum);
        }
        let mut sell_ticks = Vec::new();
        let mut sell_sums: Vec<Amount> = Vec::new();
        for level in self.sells.values() {
            if level.price > price {
                break;
            }
            let sum =
                sell_sums.last().copied().unwrap_or(0) + ctx.total_open_amount(&level.orders);
            sell_ticks.push(level);
            sell_sums.push(sum);
        }
        if buy_ticks.is_empty() || sell_ticks.is_empty() {
            return false;
        }

        let match_amount = (*buy_sums.last().unwrap()).min(*sell_sums.last().unwrap());
        if match_amount == 0 {
            return false;
        }
        let bi = buy_sums.partition_point(|&sum| sum < match_amount);
        let si = sell_sums.partition_point(|&sum| sum < match_amount);
        distribute_to_ticks(ctx, &buy_ticks, &buy_sums, bi, match_amount, price);
        distribute_to_ticks(ctx, &sell_ticks, &sell_sums, si, match_amount, price);
        true
    }
}

/// Fully matches the ticks before the marginal one, then fills the
/// marginal tick exactly up to `match_amount`.
fn distribute_to_ticks<O: Order>(
    ctx: &mut MatchContext,
    ticks: &[&TickLevel<O>],
    sums: &[Amount],
    last_idx: usize,
    match_amount: Amount,
    price: Decimal,
) {
    for level in &ticks[..last_idx] {
        ctx.match_orders_full(&level.orders, price);
    }
    let remaining = if last_idx == 0 {
        match_amount
    } else {
        match_amount - sums[last_idx - 1]
    };
    let last = ticks[last_idx];
    if ctx.total_open_amount(&last.orders) == remaining {
        ctx.match_orders_full(&last.orders, price);
    } else {
        distribute_order_amount(ctx, &last.orders, price, remaining);
    }
}

impl<O: Order> OrderSource for OrderBook<O> {
    fn highest_buy_price(&self) -> Option<Decimal> {
        self.buys
            .values()
            .find(|level| level.total_open_amount() > 0)
            .map(|level| level.price)
    }

    fn lowest_sell_price(&self) -> Option<Decimal> {
        self.sells
            .values()
            .find(|level| level.total_open_amount() > 0)
            .map(|level| level.price)
    }

    fn buy_amount_over(&self, price: Decimal) -> Amount {
        self.buys
            .values()
            .take_while(|level| level.price >= price)
            .map(TickLevel::total_open_amount)
            .sum()
    }

    fn sell_amount_under(&self, price: Decimal) -> Amount {
        self.sells
            .values()
            .take_while(|level| level.price <= price)
            .map(TickLevel::total_open_amount)
            .sum()
    }
}
