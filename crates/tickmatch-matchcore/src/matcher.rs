//! Single-price clearing and the batch match driver.
//!
//! Two ways to realize fills exist side by side, as in the original
//! engine:
//!
//! - [`match_orders`] mutates crossed order slices directly at one price
//!   (the host path for ad-hoc matching at a known price), and
//! - [`MatchEngine::run`] journals fills through
//!   [`OrderBook::instant_match`] and applies them in one commit pass via
//!   [`apply_match_results`].
//!
//! Both report the quote-coin dust back to the caller: the surplus left
//! over because buyers pay `⌈P·a⌉` while sellers receive `⌊P·a⌋`. The
//! core never absorbs it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use tickmatch_types::numeric::{mul_int_ceil, mul_int_floor};
use tickmatch_types::{Amount, Direction, Order};

use crate::clearing::find_match_price;
use crate::context::MatchContext;
use crate::determinism::compute_fill_root;
use crate::orderbook::OrderBook;
use crate::tick::TickPrecision;

/// Where full matching stops on each side of a single-price clearing.
///
/// Orders before `last_buy_idx` / `last_sell_idx` are matched for their
/// whole open amount; the order at the index is matched for the partial
/// amount only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastMatchableOrders {
    pub last_buy_idx: usize,
    pub last_sell_idx: usize,
    pub buy_partial_amount: Amount,
    pub sell_partial_amount: Amount,
}

/// Finds the last matchable order on each side for a clearing at
/// `match_price`.
///
/// `buy_orders` must be sorted best-first (price descending, then
/// priority) and `sell_orders` price ascending; both sides must be
/// willing to trade at `match_price`. Starting from the worst order of
/// each side, an order is dropped when the other orders of its side
/// already cover the matchable amount, or (on the sell side) when its
/// partial fill would truncate to zero received quote coin. Dropping
/// shrinks the side's total, so the loop re-examines both sides until
/// neither drops.
///
/// Returns `None` when either side runs out of matchable orders.
#[must_use]
pub fn find_last_matchable_orders<O: Order>(
    buy_orders: &[O],
    sell_orders: &[O],
    match_price: Decimal,
) -> Option<LastMatchableOrders> {
    if buy_orders.is_empty() || sell_orders.is_empty() {
        return None;
    }
    let mut buy = SideState::new(buy_orders);
    let mut sell = SideState::new(sell_orders);
    loop {
        let buy_settled = buy.examine(sell.total_open, Direction::Buy, match_price)?;
        let sell_settled = sell.examine(buy.total_open, Direction::Sell, match_price)?;
        if buy_settled && sell_settled {
            return Some(LastMatchableOrders {
                last_buy_idx: buy.idx,
                last_sell_idx: sell.idx,
                buy_partial_amount: buy.partial,
                sell_partial_amount: sell.partial,
            });
        }
    }
}

struct SideState<'a, O> {
    orders: &'a [O],
    total_open: Amount,
    idx: usize,
    partial: Amount,
}

impl<'a, O: Order> SideState<'a, O> {
    fn new(orders: &'a [O]) -> Self {
        Self {
            orders,
            total_open: orders.iter().map(Order::open_amount).sum(),
            idx: orders.len() - 1,
            partial: 0,
        }
    }

    /// Checks the current last order; drops it when it cannot take part.
    /// `Some(true)` means the side is settled this round, `None` that the
    /// side ran out of orders.
    fn examine(
        &mut self,
        other_side_open: Amount,
        direction: Direction,
        match_price: Decimal,
    ) -> Option<bool> {
        let open = self.orders[self.idx].open_amount();
        let match_amount = self.total_open.min(other_side_open);
        let others = self.total_open - open;
        let drop = if others >= match_amount {
            true
        } else {
            self.partial = match_amount - others;
            direction == Direction::Sell && mul_int_floor(match_price, self.partial) == 0
        };
        if drop {
            self.total_open -= open;
            if self.idx == 0 {
                return None;
            }
            self.idx -= 1;
            return Some(false);
        }
        Some(true)
    }
}

/// Matches crossed orders at `match_price`, mutating them in place.
///
/// Orders up to the last matchable index fill fully; the last order on
/// each side fills partially. A buy pays `⌈P·a⌉` quote for `a` base; a
/// sell pays `a` base for `⌊P·a⌋` quote. Returns the quote-coin dust
/// (total paid minus total received) for the caller to settle, or `None`
/// when nothing is matchable.
pub fn match_orders<O: Order>(
    buy_orders: &mut [O],
    sell_orders: &mut [O],
    match_price: Decimal,
) -> Option<Amount> {
    let last = find_last_matchable_orders(buy_orders, sell_orders, match_price)?;

    let mut paid_quote: Amount = 0;
    let mut received_quote: Amount = 0;
    for (i, order) in buy_orders[..=last.last_buy_idx].iter_mut().enumerate() {
        let received_base = if i < last.last_buy_idx {
            order.open_amount()
        } else {
            last.buy_partial_amount
        };
        let paid = mul_int_ceil(match_price, received_base);
        order.set_open_amount(order.open_amount() - received_base);
        order.decr_remaining_offer_coin(paid);
        order.incr_received_demand_coin(received_base);
        order.set_matched(true);
        paid_quote += paid;
    }
    for (i, order) in sell_orders[..=last.last_sell_idx].iter_mut().enumerate() {
        let paid_base = if i < last.last_sell_idx {
            order.open_amount()
        } else {
            last.sell_partial_amount
        };
        let received = mul_int_floor(match_price, paid_base);
        order.set_open_amount(order.open_amount() - paid_base);
        order.decr_remaining_offer_coin(paid_base);
        order.incr_received_demand_coin(received);
        order.set_matched(true);
        received_quote += received;
    }
    Some(quote_dust(paid_quote, received_quote))
}

/// Applies a finished journal to the orders it touched.
///
/// For every journalled record the order's `open_amount` drops by the
/// record amount; a buy pays `⌈price·amount⌉` offer coin and is credited
/// the base amount, a sell pays the base amount and is credited
/// `⌊price·amount⌋` quote. Orders absent from the journal are untouched.
/// Returns the quote-coin dust of the whole batch.
pub fn apply_match_results<'a, O, I>(ctx: &MatchContext, orders: I) -> Amount
where
    O: Order + 'a,
    I: IntoIterator<Item = &'a mut O>,
{
    let mut paid_quote: Amount = 0;
    let mut received_quote: Amount = 0;
    for order in orders {
        let Some(result) = ctx.result(order.id()) else {
            continue;
        };
        if result.match_records.is_empty() {
            continue;
        }
        let mut matched_base: Amount = 0;
        for record in &result.match_records {
            match order.direction() {
                Direction::Buy => {
                    let paid = mul_int_ceil(record.price, record.amount);
                    order.decr_remaining_offer_coin(paid);
                    order.incr_received_demand_coin(record.amount);
                    paid_quote += paid;
                }
                Direction::Sell => {
                    let received = mul_int_floor(record.price, record.amount);
                    order.decr_remaining_offer_coin(record.amount);
                    order.incr_received_demand_coin(received);
                    received_quote += received;
                }
            }
            matched_base += record.amount;
        }
        order.set_open_amount(order.open_amount() - matched_base);
        order.set_matched(true);
    }
    quote_dust(paid_quote, received_quote)
}

fn quote_dust(paid: Amount, received: Amount) -> Amount {
    paid.checked_sub(received)
        .unwrap_or_else(|| panic!("quote dust underflow: paid {paid} < received {received}"))
}

/// Outcome of one batch match.
#[derive(Debug, Clone)]
pub struct BatchMatch {
    /// The discovered clearing price.
    pub clearing_price: Decimal,
    /// Surplus quote coin from buy-side ceiling and sell-side truncation.
    pub quote_dust: Amount,
    /// SHA-256 digest of the fill journal, for cross-node comparison.
    pub fill_root: [u8; 32],
    /// The committed fill journal.
    pub context: MatchContext,
}

/// Drives one batch: price discovery, journalled matching at the clearing
/// price, then a single commit pass over the book's orders.
#[derive(Debug, Clone, Copy)]
pub struct MatchEngine {
    precision: TickPrecision,
}

impl MatchEngine {
    #[must_use]
    pub fn new(precision: TickPrecision) -> Self {
        Self { precision }
    }

    /// Matches the book's snapshot, committing fills into the orders.
    ///
    /// Returns `None`, with every order untouched, when the book is
    /// uncrossed or nothing is matchable at the clearing price.
    pub fn run<O: Order>(&self, book: &mut OrderBook<O>) -> Option<BatchMatch> {
        let clearing_price = find_match_price(book, self.precision)?;
        let mut ctx = MatchContext::new();
        if !book.instant_match(&mut ctx, clearing_price) {
            return None;
        }
        let fill_root = compute_fill_root(&ctx);
        let quote_dust = apply_match_results(&ctx, book.orders_mut());
        debug!(
            %clearing_price,
            quote_dust,
            orders_filled = ctx.len(),
            fill_root = %hex::encode(fill_root),
            "batch matched"
        );
        Some(BatchMatch {
            clearing_price,
            quote_dust,
            fill_root,
            context: ctx,
        })
    }
}

/// Groups orders by batch id, ascending, with unbatched orders
/// (`batch_id == 0`) in the final group.
#[must_use]
pub fn group_orders_by_batch_id<O: Order>(orders: Vec<O>) -> Vec<Vec<O>> {
    let mut groups: BTreeMap<u64, Vec<O>> = BTreeMap::new();
    for order in orders {
        groups.entry(order.batch_id().0).or_default().push(order);
    }
    let unbatched = groups.remove(&0);
    let mut grouped: Vec<Vec<O>> = groups.into_values().collect();
    grouped.extend(unbatched);
    grouped
}
