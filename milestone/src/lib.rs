//! Rust-native building blocks for milestone consensus on a DAG ledger
//!
//! Milestones are transactions issued by a committee and signed with
//! one-time keys committed in a Merkle tree. This crate bundles the pieces a
//! node needs to accept them: signature verification, the round history and
//! the background solidification of candidates.

#![warn(missing_docs)]

#[doc(inline)]
pub use milestone_crypto as crypto;

#[doc(inline)]
pub use milestone_configs as configs;

pub mod storage {
    //! Persistence of finalized rounds

    #[doc(inline)]
    pub use milestone_rounddb as rounddb;
}

#[doc(inline)]
pub use milestone_solidifier as solidifier;

pub mod tracker;
