//! The logarithmic tick lattice prices are quantized onto.
//!
//! A [`TickPrecision`] of `p` keeps `p + 1` significant decimal digits:
//! within the decade `[10^c, 10^(c+1))` ticks are spaced `10^(c-p)` apart,
//! so every decade holds `9 * 10^p` ticks. Tick indices are contiguous
//! integers starting at 0 for the lowest tick `10^(p-18)`; the highest
//! supported tick is `10^20`.
//!
//! All operations are pure and total within that domain, and
//! `tick_from_index(tick_to_index(P)) == P` holds for every lattice price.

use rust_decimal::Decimal;
use tickmatch_types::constants::{DEC_SCALE, HIGHEST_PRICE_EXPONENT, MAX_TICK_PRECISION};
use tickmatch_types::numeric::{decimal_digits, pow10};
use tickmatch_types::{Result, TickmatchError};

/// Index arithmetic stays exact up to the digit position of the highest
/// price mantissa at scale 18: `10^20 * 10^18 = 10^38`.
const HIGHEST_MANTISSA_DIGITS: u32 = HIGHEST_PRICE_EXPONENT + DEC_SCALE;

/// A tick lattice of a given precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPrecision(u32);

impl TickPrecision {
    /// Creates a lattice with `p + 1` significant digits per tick.
    ///
    /// # Errors
    /// Returns `InvalidTickPrecision` above [`MAX_TICK_PRECISION`].
    pub fn new(precision: u32) -> Result<Self> {
        if precision > MAX_TICK_PRECISION {
            return Err(TickmatchError::InvalidTickPrecision(precision));
        }
        Ok(Self(precision))
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of ticks in one decade.
    fn ticks_per_decade(self) -> i64 {
        #[allow(clippy::cast_possible_wrap)]
        let per = (9 * pow10(self.0)) as i64;
        per
    }

    /// Index of the highest supported tick, `10^20`.
    #[must_use]
    pub fn highest_index(self) -> i64 {
        i64::from(HIGHEST_MANTISSA_DIGITS - self.0) * self.ticks_per_decade()
    }

    /// The lowest lattice price, `10^(p-18)`.
    #[must_use]
    pub fn lowest_tick(self) -> Decimal {
        self.tick_from_index(0)
    }

    /// The highest lattice price, `10^20`.
    #[must_use]
    pub fn highest_tick(self) -> Decimal {
        self.tick_from_index(self.highest_index())
    }

    /// Index of the tick at or directly below `price`.
    ///
    /// For a lattice price this is the exact inverse of
    /// [`tick_from_index`](Self::tick_from_index). `price` must lie in
    /// `[lowest_tick, highest_tick]`; anything else is a caller fault.
    #[must_use]
    pub fn tick_to_index(self, price: Decimal) -> i64 {
        let m18 = mantissa_at_scale_18(price);
        let p = self.0;
        assert!(
            m18 >= pow10(p) && m18 <= pow10(HIGHEST_MANTISSA_DIGITS),
            "price {price} is out of the tick range"
        );
        let l = decimal_digits(m18) - 1;
        let t = if l > p { m18 / pow10(l - p) } else { m18 };
        #[allow(clippy::cast_possible_wrap)]
        let offset = (t - pow10(p)) as i64;
        i64::from(l - p) * self.ticks_per_decade() + offset
    }

    /// The lattice price at `index`.
    ///
    /// Defined on `[-10^p, highest_index + 9 * 10^p]`: the headroom on
    /// both ends is what the bidirectional discovery search probes. The
    /// steps below index 0 continue at `10^-18` spacing and bottom out
    /// at price zero.
    #[must_use]
    pub fn tick_from_index(self, index: i64) -> Decimal {
        let per_decade = self.ticks_per_decade();
        #[allow(clippy::cast_possible_wrap)]
        let floor = -(pow10(self.0) as i64);
        assert!(
            index >= floor && index <= self.highest_index() + per_decade,
            "tick index {index} is out of range"
        );
        // Truncated division: quotient and remainder follow the sign of
        // the index, extending the lowest decade below index 0.
        let q = index / per_decade;
        let r = index % per_decade;
        #[allow(clippy::cast_sign_loss)]
        let t = (i128::from(pow10(self.0) as i64) + i128::from(r)) as u128;
        #[allow(clippy::cast_sign_loss)]
        let q = q as u32;
        let (mantissa, scale) = if q >= DEC_SCALE {
            (t * pow10(q - DEC_SCALE), 0)
        } else {
            (t, DEC_SCALE - q)
        };
        decimal_from_parts(mantissa, scale)
    }

    /// Snaps an off-lattice price to the nearest tick, ties to the even
    /// index. Lattice prices come back unchanged (in canonical form).
    #[must_use]
    pub fn round_price(self, price: Decimal) -> Decimal {
        let index = self.tick_to_index(price);
        let lower = self.tick_from_index(index);
        if lower == price {
            return lower;
        }
        let upper = self.tick_from_index(index + 1);
        match (price - lower).cmp(&(upper - price)) {
            std::cmp::Ordering::Less => lower,
            std::cmp::Ordering::Greater => upper,
            std::cmp::Ordering::Equal => {
                if index % 2 == 0 {
                    lower
                } else {
                    upper
                }
            }
        }
    }

    /// Whether `price` lies exactly on the lattice.
    #[must_use]
    pub fn is_tick_price(self, price: Decimal) -> bool {
        if price < self.lowest_tick() || price > self.highest_tick() {
            return false;
        }
        self.tick_from_index(self.tick_to_index(price)) == price
    }

    /// Validates a host-submitted limit price.
    ///
    /// # Errors
    /// `PriceOutOfRange` outside `[lowest_tick, highest_tick]`,
    /// `OffLatticePrice` for in-range prices between ticks.
    pub fn validate_tick_price(self, price: Decimal) -> Result<()> {
        if price < self.lowest_tick() || price > self.highest_tick() {
            return Err(TickmatchError::PriceOutOfRange(price));
        }
        if self.tick_from_index(self.tick_to_index(price)) != price {
            return Err(TickmatchError::OffLatticePrice(price));
        }
        Ok(())
    }
}

/// `price * 10^18` as an integer, truncating digits below the scale.
fn mantissa_at_scale_18(price: Decimal) -> u128 {
    let mantissa = price.mantissa();
    assert!(mantissa > 0, "price {price} is out of the tick range");
    #[allow(clippy::cast_sign_loss)]
    let mantissa = mantissa as u128;
    let scale = price.scale();
    if scale <= DEC_SCALE {
        mantissa * pow10(DEC_SCALE - scale)
    } else {
        mantissa / pow10(scale - DEC_SCALE)
    }
}

fn decimal_from_parts(mantissa: u128, scale: u32) -> Decimal {
    #[allow(clippy::cast_possible_wrap)]
    let mantissa = mantissa as i128;
    match Decimal::try_from_i128_with_scale(mantissa, scale) {
        Ok(d) => d,
        Err(_) => panic!("tick mantissa {mantissa}e-{scale} does not fit a decimal"),
    }
}
