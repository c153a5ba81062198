//! Glue between signature checks, solidification and the round history
//!
//! A candidate milestone goes through [`MilestoneTracker::submit`], which
//! authenticates it against the committee key and hands it to the
//! solidifier. Candidates coming out of the solidifier are recorded in
//! their round by [`MilestoneTracker::promote`].

use std::sync::Arc;

use milestone_configs::node::CommitteeConfig;
use milestone_crypto::signed_file::{digest_content, verify_signature};
use milestone_crypto::sponge::Sha3;
use milestone_rounddb::{Round, RoundIndex, RoundStore};
use milestone_solidifier::{Candidate, Intake};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Errors raised while tracking milestones
#[derive(Debug, Error)]
pub enum Error {
    /// The signature could not be read or is malformed
    #[error("invalid milestone signature: {0}")]
    Signature(#[from] milestone_crypto::Error),

    /// The round history failed
    #[error("round storage error: {0}")]
    Rounds(#[from] milestone_rounddb::Error),

    /// The candidate belongs to a round before the first milestone key
    #[error("round {round} precedes the milestone start index {start}")]
    BeforeStart {
        /// round of the candidate
        round: u64,
        /// round signed with the first key
        start: u64,
    },
}

/// Accepts signed milestone candidates and records the solid ones.
pub struct MilestoneTracker<S> {
    committee: CommitteeConfig,
    rounds: Arc<RoundIndex<S>>,
    intake: Intake,
}

impl<S: RoundStore> MilestoneTracker<S> {
    /// Track milestones of `committee`, feeding candidates to `intake`.
    pub fn new(committee: CommitteeConfig, rounds: Arc<RoundIndex<S>>, intake: Intake) -> Self {
        Self {
            committee,
            rounds,
            intake,
        }
    }

    /// The shared round history
    pub fn rounds(&self) -> &Arc<RoundIndex<S>> {
        &self.rounds
    }

    /// Check `signature` for `candidate` and queue it for solidification.
    ///
    /// The signed content is the candidate hash as a single hex line, signed
    /// with the key at `round - start_index`. Returns whether the candidate
    /// was handed to the solidifier: `false` for a signature from another
    /// key, a stale round or a candidate already tracked.
    pub fn submit(&self, candidate: &Candidate, signature: &str) -> Result<bool, Error> {
        let start = self.committee.start_index;

        let index = candidate
            .round
            .checked_sub(start)
            .ok_or(Error::BeforeStart {
                round: candidate.round,
                start,
            })?;

        let content = format!("{}\n", candidate.hash);
        let digest = digest_content::<Sha3, _>(content.as_bytes())?;

        let valid = verify_signature::<Sha3, _>(
            signature.as_bytes(),
            &self.committee.public_key,
            self.committee.key_depth,
            index,
            self.committee.security,
            &digest,
        )?;

        if !valid {
            warn!(%candidate, "milestone signature does not match the committee key");
            return Ok(false);
        }

        let accepted = self.intake.add(candidate.hash, candidate.round);
        debug!(%candidate, accepted, "authentic milestone submitted");

        Ok(accepted)
    }

    /// Record a solid candidate in its round, creating the round if needed.
    pub fn promote(&self, candidate: &Candidate) -> Result<Round, Error> {
        let round = match self.rounds.get(candidate.round)? {
            Some(mut round) => {
                if round.add_milestone(candidate.hash) {
                    self.rounds.update(&round)?;
                }
                round
            }
            None => {
                let round = Round::new(candidate.round, [candidate.hash]);
                self.rounds.store(&round)?;
                round
            }
        };

        info!(%candidate, milestones = round.len(), "milestone promoted");

        Ok(round)
    }

    /// Promote every candidate received on `solid` until the channel closes
    /// or `cancel` fires. Storage failures are logged and the candidate is
    /// skipped.
    #[instrument(name = "milestone_tracker", skip_all)]
    pub async fn run(
        &self,
        mut solid: mpsc::UnboundedReceiver<Candidate>,
        cancel: CancellationToken,
    ) {
        loop {
            let candidate = tokio::select! {
                _ = cancel.cancelled() => break,
                next = solid.recv() => match next {
                    Some(candidate) => candidate,
                    None => break,
                },
            };

            if let Err(err) = self.promote(&candidate) {
                error!(%candidate, %err, "failed to promote milestone");
            }
        }

        debug!("milestone tracker stopped");
    }
}
