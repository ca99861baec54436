//! Identifiers used throughout tickmatch.
//!
//! Both ids are caller-assigned `u64` newtypes. The match journal is keyed
//! by [`OrderId`] and the engine's output feeds a replicated state machine,
//! so identity has to be stable across nodes; the core never generates
//! ids itself.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Stable order identifier, unique within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BatchId
// ---------------------------------------------------------------------------

/// Monotonically increasing batch identifier. `0` means "unbatched" and
/// sorts after every real batch when grouping orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BatchId(pub u64);

impl BatchId {
    /// The sentinel for orders that do not belong to any batch.
    pub const UNBATCHED: Self = Self(0);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn is_unbatched(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch:{}", self.0)
    }
}
