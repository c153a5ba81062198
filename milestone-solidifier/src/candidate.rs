use std::fmt;

use milestone_crypto::hash::Hash;
use serde::{Deserialize, Serialize};

pub type RoundNumber = u64;
pub type MilestoneHash = Hash<32>;

/// A transaction hash proposed as the milestone of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub hash: MilestoneHash,
    pub round: RoundNumber,
}

impl Candidate {
    pub fn new(hash: MilestoneHash, round: RoundNumber) -> Self {
        Self { hash, round }
    }

    /// true when `self` claims an earlier round than `other`
    pub fn is_older_than(&self, other: &Candidate) -> bool {
        self.round < other.round
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "candidate #{} ({})", self.round, self.hash)
    }
}
