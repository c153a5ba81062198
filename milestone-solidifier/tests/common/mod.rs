#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};

use milestone_crypto::sponge::standard_hash;
use milestone_solidifier::{MilestoneHash, ProbeError, SolidityCheck};

pub fn candidate_hash(round: u64) -> MilestoneHash {
    standard_hash(format!("candidate {round}").as_bytes())
}

pub fn boundary(at: u64) -> Arc<AtomicU64> {
    Arc::new(AtomicU64::new(at))
}

/// Records every probe and answers from a configurable set of solid hashes.
#[derive(Default)]
pub struct StubChecker {
    solid: Mutex<HashSet<MilestoneHash>>,
    all_solid: bool,
    failures_left: Mutex<HashMap<MilestoneHash, usize>>,
    calls: Mutex<Vec<MilestoneHash>>,
}

impl StubChecker {
    pub fn always_solid() -> Self {
        Self {
            all_solid: true,
            ..Default::default()
        }
    }

    pub fn never_solid() -> Self {
        Self::default()
    }

    pub fn mark_solid(&self, hash: MilestoneHash) {
        self.solid.lock().unwrap().insert(hash);
    }

    pub fn fail_times(&self, hash: MilestoneHash, times: usize) {
        self.failures_left.lock().unwrap().insert(hash, times);
    }

    pub fn calls_for(&self, hash: &MilestoneHash) -> usize {
        self.calls.lock().unwrap().iter().filter(|h| *h == hash).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl SolidityCheck for StubChecker {
    fn check_solidity(
        &self,
        hash: &MilestoneHash,
        request_missing: bool,
        max_transactions: usize,
    ) -> Result<bool, ProbeError> {
        assert!(request_missing);
        assert!(max_transactions > 0);

        self.calls.lock().unwrap().push(*hash);

        if let Some(left) = self.failures_left.lock().unwrap().get_mut(hash) {
            if *left > 0 {
                *left -= 1;
                return Err("transaction store unavailable".into());
            }
        }

        Ok(self.all_solid || self.solid.lock().unwrap().contains(hash))
    }
}
