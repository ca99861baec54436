//! Error types for the tickmatch engine.
//!
//! All errors use the `TM_ERR_` prefix convention for easy grepping in
//! logs. Error codes are grouped by subsystem:
//! - 1xx: Tick / price errors
//! - 2xx: Order / order-book errors
//!
//! "No match" is not an error: discovery and matching report it through
//! `Option` / `bool` return channels. Invariant violations (over-matching
//! an order, arithmetic overflow in consensus math) are programming faults
//! and panic instead of surfacing here.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::OrderId;

/// Central error enum for all recoverable tickmatch failures.
#[derive(Debug, Error)]
pub enum TickmatchError {
    // =================================================================
    // Tick / price errors (1xx)
    // =================================================================
    /// Tick precision outside the supported range.
    #[error("TM_ERR_100: invalid tick precision {0}")]
    InvalidTickPrecision(u32),

    /// Price outside the `[lowest_tick, highest_tick]` domain.
    #[error("TM_ERR_101: price {0} is out of the tick range")]
    PriceOutOfRange(Decimal),

    /// A limit price that is not on the tick lattice.
    #[error("TM_ERR_102: price {0} is not on the tick lattice")]
    OffLatticePrice(Decimal),

    // =================================================================
    // Order / order-book errors (2xx)
    // =================================================================
    /// An order with this id is already in the book.
    #[error("TM_ERR_200: duplicate order {0}")]
    DuplicateOrder(OrderId),

    /// The order failed validation (zero amount, non-positive price, ...).
    #[error("TM_ERR_201: invalid order: {reason}")]
    InvalidOrder { reason: String },
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TickmatchError>;
