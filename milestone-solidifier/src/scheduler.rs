//! Single-owner scheduling state
//!
//! Candidates move from the intake channel into the `pool` and from there
//! into a small `queue` that is probed on every tick. The queue always holds
//! the oldest unresolved candidates known, up to its capacity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashSet;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    Candidate, Intake, MilestoneHash, RoundNumber, SnapshotBoundary, SolidificationConfig,
    SolidityCheck,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Solid,
    Stale,
}

/// Lets a message through at most once per interval.
struct IntervalLog {
    interval: Duration,
    last: Option<Instant>,
}

impl IntervalLog {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    fn ready(&mut self) -> bool {
        let now = Instant::now();

        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

pub struct Scheduler {
    intake: mpsc::UnboundedReceiver<Candidate>,
    tracked: Arc<DashSet<MilestoneHash>>,
    pool: HashMap<MilestoneHash, RoundNumber>,
    queue: HashMap<MilestoneHash, RoundNumber>,
    // highest round in the queue, `None` once invalidated
    youngest: Option<Candidate>,
    checker: Arc<dyn SolidityCheck>,
    boundary: Arc<dyn SnapshotBoundary>,
    solid: Option<mpsc::UnboundedSender<Candidate>>,
    config: SolidificationConfig,
    status: IntervalLog,
}

impl Scheduler {
    /// Create a scheduler together with the handle producers add through.
    pub fn new(
        config: SolidificationConfig,
        checker: Arc<dyn SolidityCheck>,
        boundary: Arc<dyn SnapshotBoundary>,
    ) -> (Intake, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let tracked = Arc::new(DashSet::new());

        let intake = Intake::new(tracked.clone(), sender, boundary.clone());

        let scheduler = Self {
            intake: receiver,
            tracked,
            pool: HashMap::new(),
            queue: HashMap::with_capacity(config.queue_size),
            youngest: None,
            checker,
            boundary,
            solid: None,
            status: IntervalLog::new(config.status_log_interval()),
            config,
        };

        (intake, scheduler)
    }

    /// Emit every candidate that becomes solid on `sender`.
    pub fn with_solid_output(mut self, sender: mpsc::UnboundedSender<Candidate>) -> Self {
        self.solid = Some(sender);
        self
    }

    /// One scheduling pass. Every loop stops early once `cancel` fires.
    pub fn tick(&mut self, cancel: &CancellationToken) {
        self.drain_intake(cancel);
        self.process_queue(cancel);
        self.refill_queue(cancel);
    }

    /// queued candidates, oldest first
    pub fn queued(&self) -> Vec<Candidate> {
        sorted(&self.queue)
    }

    /// every unresolved candidate, queued ones included, oldest first
    pub fn pooled(&self) -> Vec<Candidate> {
        sorted(&self.pool)
    }

    fn drain_intake(&mut self, cancel: &CancellationToken) {
        while !cancel.is_cancelled() {
            let Ok(candidate) = self.intake.try_recv() else {
                break;
            };

            self.pool.insert(candidate.hash, candidate.round);
            self.admit(candidate);
        }
    }

    fn process_queue(&mut self, cancel: &CancellationToken) {
        for candidate in self.queued() {
            if cancel.is_cancelled() {
                break;
            }

            if candidate.round <= self.boundary.boundary_index() {
                self.resolve(candidate, Resolution::Stale);
            } else if self.is_solid(&candidate) {
                self.resolve(candidate, Resolution::Solid);
            }
        }
    }

    fn refill_queue(&mut self, cancel: &CancellationToken) {
        while !cancel.is_cancelled() && self.queue.len() < self.config.queue_size {
            match self.next_pooled() {
                Some(candidate) => self.admit(candidate),
                None => break,
            }
        }
    }

    /// Queue `candidate` if there is room, or in place of the youngest
    /// queued candidate when it is older than that one.
    fn admit(&mut self, candidate: Candidate) {
        if self.queue.contains_key(&candidate.hash) {
            return;
        }

        if self.queue.len() < self.config.queue_size {
            let becomes_youngest = self
                .youngest_queued()
                .map_or(true, |youngest| youngest.is_older_than(&candidate));

            self.queue.insert(candidate.hash, candidate.round);

            if becomes_youngest {
                self.youngest = Some(candidate);
            }

            return;
        }

        if let Some(youngest) = self.youngest_queued() {
            if candidate.is_older_than(&youngest) {
                debug!(%candidate, evicted = %youngest, "older candidate takes queue slot");

                self.queue.remove(&youngest.hash);
                self.queue.insert(candidate.hash, candidate.round);
                self.youngest = self.find_youngest();
            }
        }
    }

    fn youngest_queued(&mut self) -> Option<Candidate> {
        if self.youngest.is_none() {
            self.youngest = self.find_youngest();
        }

        self.youngest
    }

    fn find_youngest(&self) -> Option<Candidate> {
        self.queue
            .iter()
            .map(|(hash, round)| Candidate::new(*hash, *round))
            .max_by_key(|c| (c.round, c.hash))
    }

    fn next_pooled(&self) -> Option<Candidate> {
        self.pool
            .iter()
            .filter(|(hash, _)| !self.queue.contains_key(*hash))
            .map(|(hash, round)| Candidate::new(*hash, *round))
            .min_by_key(|c| (c.round, c.hash))
    }

    fn is_solid(&mut self, candidate: &Candidate) -> bool {
        if self.pool.len() > 1 && self.status.ready() {
            info!(
                "solidifying candidate #{} [{} / {}]",
                candidate.round,
                self.queue.len(),
                self.pool.len()
            );
        }

        match self
            .checker
            .check_solidity(&candidate.hash, true, self.config.max_transactions)
        {
            Ok(solid) => solid,
            Err(err) => {
                warn!(round = candidate.round, %err, "error while solidifying candidate");
                false
            }
        }
    }

    fn resolve(&mut self, candidate: Candidate, resolution: Resolution) {
        self.pool.remove(&candidate.hash);
        self.queue.remove(&candidate.hash);
        self.tracked.remove(&candidate.hash);

        if self.youngest.is_some_and(|y| y.hash == candidate.hash) {
            self.youngest = None;
        }

        match resolution {
            Resolution::Stale => {
                debug!(%candidate, "dropping candidate below snapshot boundary");
            }
            Resolution::Solid => {
                info!(%candidate, "candidate solidified");

                if let Some(solid) = &self.solid {
                    if solid.send(candidate).is_err() {
                        debug!(%candidate, "nobody listening for solid candidates");
                    }
                }
            }
        }
    }
}

fn sorted(entries: &HashMap<MilestoneHash, RoundNumber>) -> Vec<Candidate> {
    let mut out: Vec<_> = entries
        .iter()
        .map(|(hash, round)| Candidate::new(*hash, *round))
        .collect();

    out.sort_by_key(|c| (c.round, c.hash));
    out
}
