use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::{
    Candidate, Error, Intake, MilestoneHash, RoundNumber, Scheduler, SnapshotBoundary,
    SolidificationConfig, SolidityCheck,
};

enum State {
    Idle(Box<Scheduler>),
    Running(JoinHandle<()>),
    Stopped,
}

/// Background worker solidifying candidates, one tick at a time.
///
/// Ticks run with a fixed delay: the next one is scheduled only after the
/// previous one has completed, so the scheduler state never needs locking.
/// A stopped solidifier cannot be started again, build a new one instead.
pub struct CandidateSolidifier {
    intake: Intake,
    state: Mutex<State>,
    cancel: CancellationToken,
    interval: Duration,
}

impl CandidateSolidifier {
    pub fn new(
        config: SolidificationConfig,
        checker: Arc<dyn SolidityCheck>,
        boundary: Arc<dyn SnapshotBoundary>,
    ) -> Self {
        let interval = config.interval();
        let (intake, scheduler) = Scheduler::new(config, checker, boundary);

        Self::from_parts(intake, scheduler, interval)
    }

    /// Like [`CandidateSolidifier::new`], also returning a stream of the
    /// candidates that become solid.
    pub fn with_solid_output(
        config: SolidificationConfig,
        checker: Arc<dyn SolidityCheck>,
        boundary: Arc<dyn SnapshotBoundary>,
    ) -> (Self, mpsc::UnboundedReceiver<Candidate>) {
        let interval = config.interval();
        let (sender, receiver) = mpsc::unbounded_channel();
        let (intake, scheduler) = Scheduler::new(config, checker, boundary);

        let solidifier = Self::from_parts(intake, scheduler.with_solid_output(sender), interval);
        (solidifier, receiver)
    }

    fn from_parts(intake: Intake, scheduler: Scheduler, interval: Duration) -> Self {
        Self {
            intake,
            state: Mutex::new(State::Idle(Box::new(scheduler))),
            cancel: CancellationToken::new(),
            interval,
        }
    }

    /// Non-blocking, callable from any thread.
    pub fn add(&self, hash: MilestoneHash, round: RoundNumber) -> bool {
        self.intake.add(hash, round)
    }

    pub fn intake(&self) -> Intake {
        self.intake.clone()
    }

    /// Spawn the worker on the current tokio runtime. The first tick runs
    /// immediately. A solidifier shut down before starting never starts.
    pub fn start(&self) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::AlreadyStarted);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let mut state = self.state.lock().map_err(|_| Error::Poisoned)?;

        let scheduler = match std::mem::replace(&mut *state, State::Stopped) {
            State::Idle(scheduler) => scheduler,
            other => {
                *state = other;
                return Err(Error::AlreadyStarted);
            }
        };

        let handle = runtime.spawn(run(scheduler, self.cancel.clone(), self.interval));
        *state = State::Running(handle);

        Ok(())
    }

    /// Stop scheduling ticks. A tick already in flight runs to completion,
    /// bailing out of its loops at the next check.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// [`shutdown`](Self::shutdown) and wait for the worker to exit.
    pub async fn shutdown_and_wait(&self) -> Result<(), Error> {
        self.shutdown();

        let handle = {
            let mut state = self.state.lock().map_err(|_| Error::Poisoned)?;

            match std::mem::replace(&mut *state, State::Stopped) {
                State::Running(handle) => Some(handle),
                _ => None,
            }
        };

        if let Some(handle) = handle {
            handle.await?;
        }

        Ok(())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for CandidateSolidifier {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[instrument(name = "candidate_solidifier", skip_all)]
async fn run(mut scheduler: Box<Scheduler>, cancel: CancellationToken, interval: Duration) {
    info!(?interval, "solidifier started");

    loop {
        let token = cancel.clone();

        // probes block, keep them off the async workers
        let tick = tokio::task::spawn_blocking(move || {
            scheduler.tick(&token);
            scheduler
        });

        scheduler = match tick.await {
            Ok(scheduler) => scheduler,
            Err(err) => {
                error!(%err, "solidification tick failed");
                break;
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!("solidifier stopped");
}
