use milestone_crypto::hash::Hash;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};

pub type RoundNumber = u64;
pub type MilestoneHash = Hash<32>;

/// A consensus checkpoint: the milestone hashes agreed for one round index.
///
/// The index is fixed at construction. The hash set only grows, while the
/// round is being finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    index: RoundNumber,
    hashes: BTreeSet<MilestoneHash>,
}

impl Round {
    pub fn new(index: RoundNumber, hashes: impl IntoIterator<Item = MilestoneHash>) -> Self {
        Self {
            index,
            hashes: hashes.into_iter().collect(),
        }
    }

    pub fn index(&self) -> RoundNumber {
        self.index
    }

    pub fn hashes(&self) -> &BTreeSet<MilestoneHash> {
        &self.hashes
    }

    /// returns false if the hash was already part of the round
    pub fn add_milestone(&mut self, hash: MilestoneHash) -> bool {
        self.hashes.insert(hash)
    }

    pub fn contains(&self, hash: &MilestoneHash) -> bool {
        self.hashes.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round #{} (", self.index)?;

        for (i, hash) in self.hashes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{hash}")?;
        }

        f.write_str(")")
    }
}
