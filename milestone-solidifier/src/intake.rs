use std::sync::Arc;

use dashmap::DashSet;
use tokio::sync::mpsc;
use tracing::trace;

use crate::{Candidate, MilestoneHash, RoundNumber, SnapshotBoundary};

/// Producer side of the solidifier.
///
/// Cheap to clone and safe to use from any thread. Adding never blocks and
/// never touches the worker's pool or queue: candidates travel over a
/// channel and are merged on the next tick.
#[derive(Clone)]
pub struct Intake {
    // hashes waiting in the channel or pooled by the worker
    tracked: Arc<DashSet<MilestoneHash>>,
    sender: mpsc::UnboundedSender<Candidate>,
    boundary: Arc<dyn SnapshotBoundary>,
}

impl Intake {
    pub(crate) fn new(
        tracked: Arc<DashSet<MilestoneHash>>,
        sender: mpsc::UnboundedSender<Candidate>,
        boundary: Arc<dyn SnapshotBoundary>,
    ) -> Self {
        Self {
            tracked,
            sender,
            boundary,
        }
    }

    /// Hand a candidate to the worker.
    ///
    /// Returns false, doing nothing, when the hash is already tracked or the
    /// round is not above the snapshot boundary.
    pub fn add(&self, hash: MilestoneHash, round: RoundNumber) -> bool {
        if round <= self.boundary.boundary_index() {
            trace!(round, %hash, "ignoring candidate below snapshot boundary");
            return false;
        }

        if !self.tracked.insert(hash) {
            return false;
        }

        if self.sender.send(Candidate::new(hash, round)).is_err() {
            // worker is gone, nothing will ever resolve this entry
            self.tracked.remove(&hash);
            return false;
        }

        true
    }

    pub fn is_tracked(&self, hash: &MilestoneHash) -> bool {
        self.tracked.contains(hash)
    }

    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }
}
