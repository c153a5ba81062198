//! Ordered storage of rounds keyed by index
//!
//! [`RoundStore`] is the narrow ordered key-value contract the
//! [`RoundIndex`](crate::RoundIndex) is built on. A missing round is
//! `Ok(None)`, storage failures are always `Err`.

use crate::{Error, Round, RoundNumber};

mod memory;
mod rocks;

#[cfg(test)]
mod tests;

pub use memory::MemoryRoundStore;
pub use rocks::{RocksRoundStore, RoundByIndexKV};

pub trait RoundStore: Send + Sync {
    fn load(&self, index: RoundNumber) -> Result<Option<Round>, Error>;

    /// insert or overwrite the round at its index
    fn save(&self, round: &Round) -> Result<(), Error>;

    /// replace the hash set of an existing round
    fn update_hashes(&self, round: &Round) -> Result<(), Error>;

    fn delete(&self, index: RoundNumber) -> Result<(), Error>;

    fn first(&self) -> Result<Option<Round>, Error>;

    fn latest(&self) -> Result<Option<Round>, Error>;

    /// closest stored round strictly below `index`
    fn previous(&self, index: RoundNumber) -> Result<Option<Round>, Error>;

    /// closest stored round strictly above `index`
    fn next(&self, index: RoundNumber) -> Result<Option<Round>, Error>;
}
