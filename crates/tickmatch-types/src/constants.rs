//! Consensus-wide constants for the tickmatch engine.

/// Fractional digits of the fixed-point price scale. Every lattice price
/// has a decimal scale of at most this value.
pub const DEC_SCALE: u32 = 18;

/// Exponent of the highest supported price: prices run up to `10^20`.
pub const HIGHEST_PRICE_EXPONENT: u32 = 20;

/// Highest tick precision the lattice supports. Every extra digit
/// multiplies the tick-index range tenfold; nine significant digits per
/// tick already outruns any pricing need.
pub const MAX_TICK_PRECISION: u32 = 8;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
