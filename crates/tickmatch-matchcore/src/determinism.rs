//! Cross-replica verification of a batch outcome.
//!
//! Every node matching the same order snapshot must produce the exact
//! same fill journal. The fill root is a SHA-256 digest over the journal
//! that lets replicas compare outcomes without exchanging the journal
//! itself.

use sha2::{Digest, Sha256};

use crate::context::MatchContext;

/// Computes the fill root of a journal.
///
/// The digest covers, in ascending order-id order: each order's id, its
/// remaining open amount and its match records (amount and price). The
/// same journal always produces the same root; any difference in a fill,
/// a price or a record ordering changes it.
#[must_use]
pub fn compute_fill_root(ctx: &MatchContext) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"tickmatch:fill_root:v1:");
    hasher.update((ctx.len() as u64).to_le_bytes());

    for (id, result) in ctx.iter() {
        hasher.update(id.0.to_le_bytes());
        hasher.update(result.open_amount.to_le_bytes());
        hasher.update((result.match_records.len() as u64).to_le_bytes());
        for record in &result.match_records {
            hasher.update(record.amount.to_le_bytes());
            hasher.update(record.price.to_string().as_bytes());
        }
    }

    let digest = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&digest);
    root
}

/// Recomputes the fill root and compares it with `expected`.
#[must_use]
pub fn verify_fill_root(ctx: &MatchContext, expected: &[u8; 32]) -> bool {
    compute_fill_root(ctx) == *expected
}
