//! Cryptographic building blocks used to authenticate milestones.
//!
//! * [`sponge`] the stateful hash primitive everything else is built on
//! * [`merkle`] authentication paths committing many keys under one root
//! * [`winternitz`] hash-chain one-time signatures
//! * [`signed_file`] verification of detached signature files

pub mod errors;
pub mod hash;
pub mod merkle;
pub mod signed_file;
pub mod sponge;
pub mod winternitz;

pub use errors::Error;
