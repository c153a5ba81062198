pub mod index;
pub mod kvtable;
pub mod round;
pub mod store;

pub use index::RoundIndex;
pub use kvtable::Error;
pub use round::{Round, RoundNumber};
pub use store::{MemoryRoundStore, RocksRoundStore, RoundStore};
