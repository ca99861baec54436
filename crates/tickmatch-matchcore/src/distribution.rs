//! Allocation of a matched volume across the orders at one tick.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tickmatch_types::numeric::{mul_int_floor, quo_truncate};
use tickmatch_types::{Amount, Direction, Order, OrderId};

use crate::context::MatchContext;

/// Distributes `amount` base units across `orders` (all at one price, one
/// direction, in priority order) and records the shares at `match_price`.
///
/// Each order first gets the floor of its proportional share,
/// `⌊(order.amount / Σ amounts) · amount⌋`, clamped to its open amount.
/// The truncation remainder is then handed out in priority order, each
/// order taking as much of it as it still has capacity for.
///
/// An order whose allocation would truncate to zero received quote coin
/// (a sell whose `⌊price · share⌋` is zero) must not be credited; such
/// orders are dropped and the whole distribution re-runs over the
/// remaining candidates with the same `amount`. The candidate set shrinks
/// strictly every re-run, so this settles within `orders.len()` rounds.
/// If every order is dropped, nothing is recorded.
pub fn distribute_order_amount<O: Order>(
    ctx: &mut MatchContext,
    orders: &[O],
    match_price: Decimal,
    amount: Amount,
) {
    if amount == 0 {
        return;
    }
    let mut candidates: Vec<usize> = (0..orders.len()).collect();
    let mut rounds = 0;
    loop {
        rounds += 1;
        assert!(
            rounds <= orders.len() + 1,
            "distribution failed to settle after {rounds} rounds"
        );

        let total_amount: Amount = candidates
            .iter()
            .filter(|&&i| ctx.open_amount(&orders[i]) > 0)
            .map(|&i| orders[i].amount())
            .sum();
        if total_amount == 0 {
            return;
        }

        let mut matched_by_order: BTreeMap<OrderId, Amount> = BTreeMap::new();
        let mut total_matched: Amount = 0;
        for &i in &candidates {
            let order = &orders[i];
            let open = ctx.open_amount(order);
            if open == 0 {
                continue;
            }
            let proportion = quo_truncate(order.amount(), total_amount);
            let matched = open.min(mul_int_floor(proportion, amount));
            if matched > 0 {
                matched_by_order.insert(order.id(), matched);
                total_matched += matched;
            }
        }

        let mut remaining = amount - total_matched;
        for &i in &candidates {
            if remaining == 0 {
                break;
            }
            let order = &orders[i];
            let assigned = matched_by_order.get(&order.id()).copied().unwrap_or(0);
            let capacity = ctx.open_amount(order).min(order.amount()) - assigned;
            let take = remaining.min(capacity);
            if take > 0 {
                *matched_by_order.entry(order.id()).or_insert(0) += take;
                remaining -= take;
            }
        }

        let mut matched = Vec::with_capacity(candidates.len());
        let mut dropped = false;
        for &i in &candidates {
            let order = &orders[i];
            let share = matched_by_order.get(&order.id()).copied().unwrap_or(0);
            let receives_quote = order.direction() == Direction::Buy
                || mul_int_floor(match_price, share) > 0;
            if share > 0 && receives_quote {
                matched.push(i);
            } else {
                dropped = true;
            }
        }
        if dropped {
            if matched.is_empty() {
                return;
            }
            candidates = matched;
            continue;
        }

        for &i in &candidates {
            let order = &orders[i];
            if let Some(&share) = matched_by_order.get(&order.id()) {
                ctx.match_order(order, share, match_price);
            }
        }
        return;
    }
}
