//! Cached access to the round history
//!
//! [`RoundIndex`] owns the in-memory view of finalized rounds and delegates
//! durability to a [`RoundStore`]. It is constructed once at node startup
//! and shared by handle; pruning evicts entries through
//! [`RoundIndex::clear_index`] so the cache never outlives storage.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, trace};

use crate::{Error, Round, RoundNumber, RoundStore};


#[derive(Debug, Default)]
struct Cache {
    rounds: HashMap<RoundNumber, Round>,
    // bumped on every write and eviction, so loads started before it are not cached
    epoch: u64,
}

pub struct RoundIndex<S> {
    store: S,
    cache: Mutex<Cache>,
}

impl<S: RoundStore> RoundIndex<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: Mutex::new(Cache::default()),
        }
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    fn cache(&self) -> Result<MutexGuard<'_, Cache>, Error> {
        self.cache.lock().map_err(|_| Error::Poisoned)
    }

    /// Round at `index`, from cache or storage.
    ///
    /// Rounds without milestone hashes count as missing. A load that races
    /// with a write or an eviction is returned to the caller but not cached.
    pub fn get(&self, index: RoundNumber) -> Result<Option<Round>, Error> {
        let epoch = {
            let cache = self.cache()?;

            if let Some(round) = cache.rounds.get(&index) {
                return Ok(Some(round.clone()));
            }

            cache.epoch
        };

        let round = match self.store.load(index)? {
            Some(round) if !round.is_empty() => round,
            _ => return Ok(None),
        };

        let mut cache = self.cache()?;

        if cache.epoch == epoch {
            cache.rounds.insert(index, round.clone());
        } else {
            debug!(index, "cache changed during load, result not cached");
        }

        Ok(Some(round))
    }

    pub fn first(&self) -> Result<Option<Round>, Error> {
        self.store.first()
    }

    pub fn latest(&self) -> Result<Option<Round>, Error> {
        self.store.latest()
    }

    /// stored round preceding `round` in index order
    pub fn previous(&self, round: &Round) -> Result<Option<Round>, Error> {
        self.store.previous(round.index())
    }

    /// stored round following `round` in index order
    pub fn next(&self, round: &Round) -> Result<Option<Round>, Error> {
        self.store.next(round.index())
    }

    /// Closest round strictly below `index` and not below `min_index`.
    ///
    /// Scans one index at a time, the bound keeps the walk short.
    pub fn find_closest_prev_round(
        &self,
        index: RoundNumber,
        min_index: RoundNumber,
    ) -> Result<Option<Round>, Error> {
        let mut current = index;

        while let Some(candidate) = current.checked_sub(1).filter(|c| *c >= min_index) {
            if let Some(round) = self.get(candidate)? {
                return Ok(Some(round));
            }

            current = candidate;
        }

        Ok(None)
    }

    /// Closest round strictly above `index` and not above `max_index`.
    pub fn find_closest_next_round(
        &self,
        index: RoundNumber,
        max_index: RoundNumber,
    ) -> Result<Option<Round>, Error> {
        let mut current = index;

        while let Some(candidate) = current.checked_add(1).filter(|c| *c <= max_index) {
            if let Some(round) = self.get(candidate)? {
                return Ok(Some(round));
            }

            current = candidate;
        }

        Ok(None)
    }

    /// Persist `round`, refreshing an already cached copy.
    pub fn store(&self, round: &Round) -> Result<(), Error> {
        self.store.save(round)?;
        self.refresh(round)
    }

    /// Persist the hash set of `round`, refreshing an already cached copy.
    pub fn update(&self, round: &Round) -> Result<(), Error> {
        self.store.update_hashes(round)?;
        self.refresh(round)
    }

    pub fn delete(&self, round: &Round) -> Result<(), Error> {
        self.store.delete(round.index())?;
        self.clear_index(round.index())
    }

    fn refresh(&self, round: &Round) -> Result<(), Error> {
        let mut cache = self.cache()?;
        cache.epoch += 1;

        if let Some(cached) = cache.rounds.get_mut(&round.index()) {
            trace!(index = round.index(), "refreshing cached round");
            cached.clone_from(round);
        }

        Ok(())
    }

    /// drop every cached round
    pub fn clear(&self) -> Result<(), Error> {
        let mut cache = self.cache()?;
        cache.rounds.clear();
        cache.epoch += 1;

        debug!("round cache cleared");
        Ok(())
    }

    /// drop the cached round at `index`, used when pruning deletes it
    pub fn clear_index(&self, index: RoundNumber) -> Result<(), Error> {
        let mut cache = self.cache()?;
        cache.rounds.remove(&index);
        cache.epoch += 1;

        Ok(())
    }

    pub fn is_cached(&self, index: RoundNumber) -> bool {
        self.cache()
            .map(|cache| cache.rounds.contains_key(&index))
            .unwrap_or(false)
    }
}
