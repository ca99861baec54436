//! Exact fixed-point arithmetic for the matching engine.
//!
//! Prices are [`Decimal`]s with at most [`DEC_SCALE`] fractional digits;
//! amounts are [`Amount`] base units. Every `price × amount` product and
//! every ratio in this module widens to [`U256`] internally, so floor,
//! ceiling and truncation results are exact for the whole supported domain
//! (prices up to `10^20`, amounts up to `u128::MAX`) instead of being
//! clipped by `Decimal`'s 96-bit mantissa.
//!
//! The rounding modes here are part of the consensus contract: the results
//! feed a replicated state machine, so `truncate`, `ceil` and
//! round-half-to-even must behave identically on every node and every
//! build. Overflow of any operation is a programming fault (the engine
//! validates its domain up front) and panics.

use primitive_types::U256;
use rust_decimal::Decimal;

use crate::constants::DEC_SCALE;
use crate::Amount;

/// Largest mantissa a [`Decimal`] can carry (`2^96 - 1`).
const MAX_DEC_MANTISSA: u128 = 79_228_162_514_264_337_593_543_950_335;

/// `10^n` as an [`Amount`]. `n` must be at most 38.
#[must_use]
pub fn pow10(n: u32) -> Amount {
    assert!(n <= 38, "pow10 exponent {n} exceeds u128 range");
    10u128.pow(n)
}

/// Number of decimal digits of `n` (`0` has one digit).
#[must_use]
pub fn decimal_digits(n: u128) -> u32 {
    if n == 0 {
        1
    } else {
        n.ilog10() + 1
    }
}

/// Splits a non-negative decimal into `(mantissa, scale)`.
fn dec_parts(d: Decimal) -> (u128, u32) {
    let mantissa = d.mantissa();
    assert!(mantissa >= 0, "negative price {d} in consensus arithmetic");
    #[allow(clippy::cast_sign_loss)]
    let mantissa = mantissa as u128;
    (mantissa, d.scale())
}

fn to_amount(x: U256, op: &str) -> Amount {
    assert!(x.bits() <= 128, "amount overflow in {op}");
    x.low_u128()
}

fn to_decimal(mantissa: U256, scale: u32, op: &str) -> Decimal {
    let mut mantissa = mantissa;
    let mut scale = scale;
    let max = U256::from(MAX_DEC_MANTISSA);
    // Shed trailing zeros before giving up on the 96-bit mantissa.
    while mantissa > max && scale > 0 && (mantissa % U256::from(10u8)).is_zero() {
        mantissa /= U256::from(10u8);
        scale -= 1;
    }
    assert!(mantissa <= max, "decimal overflow in {op}");
    #[allow(clippy::cast_possible_wrap)]
    let mantissa = mantissa.low_u128() as i128;
    Decimal::from_i128_with_scale(mantissa, scale)
}

/// Exact `price × amount` as a decimal.
///
/// Panics if the exact product does not fit a [`Decimal`]; the engine
/// itself always uses the fused [`mul_int_floor`] / [`mul_int_ceil`]
/// forms, which have no such limit.
#[must_use]
pub fn mul_int(price: Decimal, amount: Amount) -> Decimal {
    let (m, s) = dec_parts(price);
    to_decimal(U256::from(m) * U256::from(amount), s, "mul_int")
}

/// `⌊price × amount⌋` in base units, computed exactly.
#[must_use]
pub fn mul_int_floor(price: Decimal, amount: Amount) -> Amount {
    let (m, s) = dec_parts(price);
    let unit = U256::from(pow10(s));
    to_amount(U256::from(m) * U256::from(amount) / unit, "mul_int_floor")
}

/// `⌈price × amount⌉` in base units, computed exactly.
#[must_use]
pub fn mul_int_ceil(price: Decimal, amount: Amount) -> Amount {
    let (m, s) = dec_parts(price);
    let unit = U256::from(pow10(s));
    let product = U256::from(m) * U256::from(amount);
    to_amount((product + unit - U256::from(1u8)) / unit, "mul_int_ceil")
}

/// `num / den` truncated to [`DEC_SCALE`] fractional digits.
///
/// This is the share-proportion primitive of the distribution step: the
/// quotient is floored at the 18th fractional digit, never rounded.
/// Panics if `den` is zero or the quotient exceeds the decimal range.
#[must_use]
pub fn quo_truncate(num: Amount, den: Amount) -> Decimal {
    assert!(den != 0, "division by zero in quo_truncate");
    let scaled = U256::from(num) * U256::from(pow10(DEC_SCALE));
    to_decimal(scaled / U256::from(den), DEC_SCALE, "quo_truncate")
}

/// `⌊d⌋` in base units for a non-negative decimal.
#[must_use]
pub fn truncate_int(d: Decimal) -> Amount {
    let (m, s) = dec_parts(d);
    m / pow10(s)
}

/// `⌈d⌉` in base units for a non-negative decimal.
#[must_use]
pub fn ceil_int(d: Decimal) -> Amount {
    let (m, s) = dec_parts(d);
    let unit = pow10(s);
    m / unit + u128::from(m % unit != 0)
}

/// `d` rounded to base units, half to even, for a non-negative decimal.
#[must_use]
pub fn round_int(d: Decimal) -> Amount {
    let (m, s) = dec_parts(d);
    let unit = pow10(s);
    let (q, r) = (m / unit, m % unit);
    match (2 * r).cmp(&unit) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q % 2),
    }
}
