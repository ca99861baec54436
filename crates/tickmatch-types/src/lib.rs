//! # tickmatch-types
//!
//! Shared types, errors and exact arithmetic for the **tickmatch**
//! batch-auction matching engine.
//!
//! This crate is the leaf dependency of the workspace; the matching core
//! depends on it and nothing else. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`BatchId`]
//! - **Order model**: the [`Order`] capability trait, [`BatchOrder`],
//!   [`Direction`], [`OrderKind`]
//! - **Arithmetic**: the [`numeric`] module of exact fixed-point
//!   `price × amount` operations whose rounding behavior is part of the
//!   consensus contract
//! - **Errors**: [`TickmatchError`] with `TM_ERR_` prefix codes
//! - **Constants**: the supported price/precision domain

pub mod constants;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod order;

pub use error::*;
pub use ids::*;
pub use order::*;

/// Base-unit quantity. Non-negative, indivisible units of the traded coin.
///
/// All products and ratios involving an `Amount` go through [`numeric`],
/// which widens to 256 bits internally so results are exact over the whole
/// supported domain.
pub type Amount = u128;

// Constants are accessed via `tickmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
