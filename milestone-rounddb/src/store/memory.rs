use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::RoundStore;
use crate::{Error, Round, RoundNumber};

/// Volatile store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryRoundStore {
    rounds: RwLock<BTreeMap<RoundNumber, Round>>,
}

impl MemoryRoundStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<RoundNumber, Round>>, Error> {
        self.rounds.read().map_err(|_| Error::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<RoundNumber, Round>>, Error> {
        self.rounds.write().map_err(|_| Error::Poisoned)
    }
}

impl RoundStore for MemoryRoundStore {
    fn load(&self, index: RoundNumber) -> Result<Option<Round>, Error> {
        Ok(self.read()?.get(&index).cloned())
    }

    fn save(&self, round: &Round) -> Result<(), Error> {
        self.write()?.insert(round.index(), round.clone());
        Ok(())
    }

    fn update_hashes(&self, round: &Round) -> Result<(), Error> {
        self.save(round)
    }

    fn delete(&self, index: RoundNumber) -> Result<(), Error> {
        self.write()?.remove(&index);
        Ok(())
    }

    fn first(&self) -> Result<Option<Round>, Error> {
        Ok(self.read()?.values().next().cloned())
    }

    fn latest(&self) -> Result<Option<Round>, Error> {
        Ok(self.read()?.values().next_back().cloned())
    }

    fn previous(&self, index: RoundNumber) -> Result<Option<Round>, Error> {
        let rounds = self.read()?;
        Ok(rounds.range(..index).next_back().map(|(_, r)| r.clone()))
    }

    fn next(&self, index: RoundNumber) -> Result<Option<Round>, Error> {
        let rounds = self.read()?;
        Ok(rounds
            .range((Excluded(index), Unbounded))
            .next()
            .map(|(_, r)| r.clone()))
    }
}
