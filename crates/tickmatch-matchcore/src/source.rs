//! Aggregated volume view consumed by price discovery.

use rust_decimal::Decimal;
use tickmatch_types::Amount;

/// Cumulative open-volume curves over a set of orders.
///
/// [`find_match_price`](crate::find_match_price) only ever sees orders
/// through this trait, so any host aggregate can drive discovery: an
/// [`OrderBook`], or a pool curve sampled onto the lattice.
///
/// # Contract
///
/// Values must be stable for the duration of one discovery call, and the
/// curves must be monotone: `buy_amount_over` non-increasing in the price,
/// `sell_amount_under` non-decreasing. Discovery's binary searches rely on
/// this; a non-monotone source is a caller bug and produces garbage.
///
/// [`OrderBook`]: crate::OrderBook
pub trait OrderSource {
    /// Highest buy limit that still has open volume.
    fn highest_buy_price(&self) -> Option<Decimal>;

    /// Lowest sell limit that still has open volume.
    fn lowest_sell_price(&self) -> Option<Decimal>;

    /// Total buy open amount at prices `>= price`.
    fn buy_amount_over(&self, price: Decimal) -> Amount;

    /// Total sell open amount at prices `<= price`.
    fn sell_amount_under(&self, price: Decimal) -> Amount;
}
