use std::sync::atomic::{AtomicU64, Ordering};

use crate::{MilestoneHash, RoundNumber};

pub type ProbeError = Box<dyn std::error::Error + Send + Sync>;

/// Checks whether the whole causal history of a transaction is available.
pub trait SolidityCheck: Send + Sync {
    /// `max_transactions` bounds the traversal. When `request_missing` is
    /// set, transactions found missing are requested from peers.
    fn check_solidity(
        &self,
        hash: &MilestoneHash,
        request_missing: bool,
        max_transactions: usize,
    ) -> Result<bool, ProbeError>;
}

/// Lowest round still relevant to the node; anything at or below it is stale.
pub trait SnapshotBoundary: Send + Sync {
    fn boundary_index(&self) -> RoundNumber;
}

impl SnapshotBoundary for AtomicU64 {
    fn boundary_index(&self) -> RoundNumber {
        self.load(Ordering::Acquire)
    }
}
