//! # tickmatch-matchcore
//!
//! **Pure deterministic batch-auction matching core.**
//!
//! Given a snapshot of buy and sell limit orders, the core computes a
//! single clearing price on a logarithmic tick lattice and a consistent
//! set of fills. It has:
//!
//! - **Zero side effects**: no storage writes and no event emission;
//!   those live in the surrounding chain modules
//! - **Deterministic output**: same orders in, byte-identical fills out,
//!   on every node and platform
//! - **Transactional fills**: matching records into a [`MatchContext`]
//!   journal; orders are only mutated by the commit pass afterwards
//!
//! ```text
//! orders → OrderBook → find_match_price → instant_match → commit → dust
//! ```

pub mod clearing;
pub mod context;
pub mod determinism;
pub mod distribution;
pub mod level;
pub mod matcher;
pub mod orderbook;
pub mod source;
pub mod tick;

pub use clearing::find_match_price;
pub use context::{MatchContext, MatchRecord, MatchResult};
pub use determinism::{compute_fill_root, verify_fill_root};
pub use distribution::distribute_order_amount;
pub use matcher::{
    apply_match_results, find_last_matchable_orders, group_orders_by_batch_id, match_orders,
    BatchMatch, LastMatchableOrders, MatchEngine,
};
pub use orderbook::OrderBook;
pub use source::OrderSource;
pub use tick::TickPrecision;
