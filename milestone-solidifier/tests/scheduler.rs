use std::sync::atomic::Ordering;
use std::sync::Arc;

use milestone_solidifier::{Candidate, Scheduler, SolidificationConfig};
use proptest::prelude::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

mod common;
use common::*;

fn rounds(candidates: &[Candidate]) -> Vec<u64> {
    candidates.iter().map(|c| c.round).collect()
}

#[test]
fn older_candidate_evicts_youngest_queued() {
    let checker = Arc::new(StubChecker::never_solid());
    let (intake, mut scheduler) =
        Scheduler::new(SolidificationConfig::default(), checker, boundary(0));
    let cancel = CancellationToken::new();

    for round in [10, 20, 30] {
        assert!(intake.add(candidate_hash(round), round));
    }

    scheduler.tick(&cancel);
    assert_eq!(rounds(&scheduler.queued()), vec![10, 20]);
    assert_eq!(rounds(&scheduler.pooled()), vec![10, 20, 30]);

    assert!(intake.add(candidate_hash(15), 15));
    scheduler.tick(&cancel);

    assert_eq!(rounds(&scheduler.queued()), vec![10, 15]);
    assert_eq!(rounds(&scheduler.pooled()), vec![10, 15, 20, 30]);
}

#[test]
fn stale_candidates_resolve_without_probe() {
    let checker = Arc::new(StubChecker::never_solid());
    let snapshot = boundary(0);
    let (intake, mut scheduler) = Scheduler::new(
        SolidificationConfig::default(),
        checker.clone(),
        snapshot.clone(),
    );
    let cancel = CancellationToken::new();

    assert!(intake.add(candidate_hash(5), 5));
    assert!(intake.add(candidate_hash(8), 8));

    snapshot.store(5, Ordering::Release);
    scheduler.tick(&cancel);

    assert_eq!(checker.calls_for(&candidate_hash(5)), 0);
    assert_eq!(checker.calls_for(&candidate_hash(8)), 1);
    assert_eq!(rounds(&scheduler.pooled()), vec![8]);
    assert!(!intake.is_tracked(&candidate_hash(5)));
}

#[test]
fn candidates_resolve_oldest_first() {
    let checker = Arc::new(StubChecker::never_solid());
    let (intake, scheduler) =
        Scheduler::new(SolidificationConfig::default(), checker.clone(), boundary(0));
    let (solid_tx, mut solid_rx) = mpsc::unbounded_channel();
    let mut scheduler = scheduler.with_solid_output(solid_tx);
    let cancel = CancellationToken::new();

    for round in [4, 1, 6, 3, 5, 2] {
        intake.add(candidate_hash(round), round);
        checker.mark_solid(candidate_hash(round));
    }

    let mut resolved = Vec::new();

    let expected: [Vec<u64>; 3] = [vec![3, 4], vec![5, 6], vec![]];

    for expected_queue in expected {
        scheduler.tick(&cancel);
        assert_eq!(rounds(&scheduler.queued()), expected_queue);

        while let Ok(candidate) = solid_rx.try_recv() {
            resolved.push(candidate.round);
        }
    }

    assert_eq!(resolved, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(intake.tracked_len(), 0);
}

#[test]
fn probe_errors_are_retried() {
    let checker = Arc::new(StubChecker::always_solid());
    let (intake, scheduler) =
        Scheduler::new(SolidificationConfig::default(), checker.clone(), boundary(0));
    let (solid_tx, mut solid_rx) = mpsc::unbounded_channel();
    let mut scheduler = scheduler.with_solid_output(solid_tx);
    let cancel = CancellationToken::new();

    let hash = candidate_hash(9);
    checker.fail_times(hash, 2);
    intake.add(hash, 9);

    scheduler.tick(&cancel);
    scheduler.tick(&cancel);
    assert_eq!(rounds(&scheduler.queued()), vec![9]);
    assert!(solid_rx.try_recv().is_err());

    scheduler.tick(&cancel);
    assert!(scheduler.queued().is_empty());
    assert_eq!(solid_rx.try_recv().unwrap(), Candidate::new(hash, 9));
    assert_eq!(checker.calls_for(&hash), 3);
}

#[test]
fn duplicates_and_old_rounds_are_ignored() {
    let checker = Arc::new(StubChecker::never_solid());
    let (intake, mut scheduler) =
        Scheduler::new(SolidificationConfig::default(), checker.clone(), boundary(100));
    let cancel = CancellationToken::new();

    let hash = candidate_hash(120);
    assert!(intake.add(hash, 120));
    assert!(!intake.add(hash, 120));

    scheduler.tick(&cancel);
    assert!(!intake.add(hash, 120), "pooled candidates stay tracked");

    assert!(!intake.add(candidate_hash(100), 100));
    assert!(!intake.add(candidate_hash(3), 3));

    checker.mark_solid(hash);
    scheduler.tick(&cancel);
    assert!(scheduler.pooled().is_empty());

    // resolved candidates may come back
    assert!(intake.add(hash, 120));
}

#[test]
fn cancelled_tick_does_no_work() {
    let checker = Arc::new(StubChecker::always_solid());
    let (intake, mut scheduler) =
        Scheduler::new(SolidificationConfig::default(), checker.clone(), boundary(0));

    intake.add(candidate_hash(1), 1);

    let cancel = CancellationToken::new();
    cancel.cancel();
    scheduler.tick(&cancel);

    assert!(scheduler.pooled().is_empty());
    assert_eq!(checker.total_calls(), 0);
    assert!(intake.is_tracked(&candidate_hash(1)));
}

#[derive(Debug, Clone)]
enum Op {
    Add(u64),
    Tick,
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(
        prop_oneof![
            3 => (1u64..40).prop_map(Op::Add),
            1 => Just(Op::Tick),
        ],
        1..60,
    )
}

proptest! {
    #[test]
    fn queue_holds_oldest_within_capacity(ops in ops(), queue_size in 1usize..4) {
        let checker = Arc::new(StubChecker::never_solid());
        let config = SolidificationConfig { queue_size, ..Default::default() };
        let (intake, mut scheduler) = Scheduler::new(config, checker.clone(), boundary(0));
        let cancel = CancellationToken::new();

        for (i, op) in ops.into_iter().enumerate() {
            match op {
                Op::Add(round) => {
                    let hash = candidate_hash(i as u64);
                    // some candidates become solid on their first probe
                    if i % 3 == 0 {
                        checker.mark_solid(hash);
                    }
                    intake.add(hash, round);
                }
                Op::Tick => {
                    scheduler.tick(&cancel);

                    let queued = scheduler.queued();
                    prop_assert!(queued.len() <= queue_size);

                    let waiting: Vec<_> = scheduler
                        .pooled()
                        .into_iter()
                        .filter(|c| !queued.contains(c))
                        .collect();

                    if let (Some(youngest), Some(oldest_waiting)) = (queued.last(), waiting.first()) {
                        prop_assert!(youngest.round <= oldest_waiting.round);
                    }

                    if queued.len() < queue_size {
                        prop_assert!(waiting.is_empty());
                    }
                }
            }
        }
    }
}
