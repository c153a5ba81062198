//! Candidate solidification
//!
//! Producers hand candidates to an [`Intake`] without blocking. A single
//! [`Scheduler`], driven by the [`CandidateSolidifier`] worker, moves them
//! through a pool into a bounded queue and probes the queued ones for
//! solidity, oldest round first.

use thiserror::Error;

mod candidate;
mod config;
mod intake;
mod scheduler;
mod traits;
mod worker;

pub use candidate::{Candidate, MilestoneHash, RoundNumber};
pub use config::SolidificationConfig;
pub use intake::Intake;
pub use scheduler::Scheduler;
pub use traits::{ProbeError, SnapshotBoundary, SolidityCheck};
pub use worker::CandidateSolidifier;

#[derive(Debug, Error)]
pub enum Error {
    #[error("solidifier already started")]
    AlreadyStarted,

    #[error("no tokio runtime to run the solidifier on")]
    NoRuntime,

    #[error("solidifier worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("solidifier state lock poisoned")]
    Poisoned,
}
