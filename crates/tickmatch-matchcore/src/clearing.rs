//! Clearing-price discovery over the tick lattice.
//!
//! Given the aggregate demand and supply curves of an [`OrderSource`],
//! finds the single lattice price at which a crossed book clears. The
//! result depends only on per-tick aggregates, so it is invariant under
//! any permutation of orders that preserves them.

use rust_decimal::Decimal;

use crate::source::OrderSource;
use crate::tick::TickPrecision;

/// Computes the clearing tick for the given order source.
///
/// Returns `None` for an empty or uncrossed book. Otherwise two
/// bidirectional binary searches find the boundary indexes `i` (lowest
/// index where cumulative demand above the next tick no longer exceeds
/// cumulative supply at the tick) and `j` (its mirror, searched downward);
/// the midpoint of their ticks, snapped to the lattice with banker's
/// rounding on the index, is the clearing price.
#[must_use]
pub fn find_match_price<S: OrderSource>(source: &S, precision: TickPrecision) -> Option<Decimal> {
    let highest_buy = source.highest_buy_price()?;
    let lowest_sell = source.lowest_sell_price()?;
    if highest_buy < lowest_sell {
        return None;
    }

    let lowest_idx = precision.tick_to_index(precision.lowest_tick());
    let highest_idx = precision.tick_to_index(precision.highest_tick());
    let i = find_first_true(lowest_idx, highest_idx, |i| {
        source.buy_amount_over(precision.tick_from_index(i + 1))
            <= source.sell_amount_under(precision.tick_from_index(i))
    })?;
    let j = find_first_true(highest_idx, lowest_idx, |i| {
        source.buy_amount_over(precision.tick_from_index(i))
            >= source.sell_amount_under(precision.tick_from_index(i - 1))
    })?;

    let mid = (precision.tick_from_index(i) + precision.tick_from_index(j)) / Decimal::TWO;
    Some(precision.round_price(mid))
}

/// Binary search for the first index where `f` is true, scanning from
/// `start` towards `end` (either direction).
///
/// Assumes `f` is monotone along the scan: false up to some index, true
/// from there on. Returns `None` when `f` never turns true in the range.
fn find_first_true<F>(start: i64, end: i64, f: F) -> Option<i64>
where
    F: Fn(i64) -> bool,
{
    if start <= end {
        let (mut lo, mut hi) = (start, end + 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if f(mid) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        (lo <= end).then_some(lo)
    } else {
        // Descending scan: search the offset from `start` instead.
        let (mut lo, mut hi) = (0, start - end + 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if f(start - mid) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        let i = start - lo;
        (i >= end).then_some(i)
    }
}
