// tests/batch_timing.rs

use std::time::Duration;

use batchfleet::batch::{BatchPhase, BatchTiming, OperationDurations};
use batchfleet::types::Operation;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn durations(weaken: u64, grow: u64, hack: u64) -> OperationDurations {
    OperationDurations {
        weaken: ms(weaken),
        grow: ms(grow),
        hack: ms(hack),
    }
}

#[test]
fn typical_durations_land_completions_in_order_with_gap() {
    let timing = BatchTiming::compute(&durations(40, 32, 10), ms(10));

    assert_eq!(timing.issue_at, [ms(0), ms(18), ms(28), ms(68)]);
    assert_eq!(timing.complete_at, [ms(40), ms(50), ms(68), ms(78)]);
    assert_eq!(timing.initial_delay(), ms(0));
    assert_eq!(timing.inter_operation_waits(), [ms(18), ms(10), ms(40)]);
    assert_eq!(timing.cycle_length(), ms(88));
    assert_eq!(timing.wait_after(BatchPhase::Hack), ms(20));
}

#[test]
fn weaken1_is_offset_to_finish_with_the_longest_operation() {
    let timing = BatchTiming::compute(&durations(40, 50, 10), ms(10));

    assert_eq!(timing.initial_delay(), ms(10));
    assert_eq!(timing.complete_at[0], ms(50));
    for pair in timing.complete_at.windows(2) {
        assert!(pair[1] >= pair[0] + ms(10), "{:?}", timing.complete_at);
    }
}

#[test]
fn equal_durations_space_everything_by_the_gap() {
    let timing = BatchTiming::compute(&durations(100, 100, 100), ms(5));

    assert_eq!(timing.issue_at, [ms(0), ms(5), ms(10), ms(15)]);
    assert_eq!(timing.complete_at, [ms(100), ms(105), ms(110), ms(115)]);
    assert_eq!(timing.inter_operation_waits(), [ms(5), ms(5), ms(5)]);
}

#[test]
fn zero_durations_still_respect_the_gap() {
    let timing = BatchTiming::compute(&durations(0, 0, 0), ms(5));

    assert_eq!(timing.inter_operation_waits(), [ms(5), ms(5), ms(5)]);
    assert_eq!(timing.cycle_length(), ms(20));
}

#[test]
fn cycle_is_never_shorter_than_the_longest_operation() {
    let d = durations(10, 90, 20);
    let timing = BatchTiming::compute(&d, ms(1));
    assert!(timing.cycle_length() >= d.longest());
}

#[test]
fn phases_cycle_in_strict_order() {
    assert_eq!(BatchPhase::initial(), BatchPhase::Weaken1);

    let mut phase = BatchPhase::initial();
    let mut seen = Vec::new();
    for _ in 0..5 {
        seen.push(phase);
        phase = phase.next();
    }
    assert_eq!(
        seen,
        vec![
            BatchPhase::Weaken1,
            BatchPhase::Grow,
            BatchPhase::Weaken2,
            BatchPhase::Hack,
            BatchPhase::Weaken1,
        ]
    );

    let ops: Vec<Operation> = BatchPhase::CYCLE.iter().map(|p| p.operation()).collect();
    assert_eq!(
        ops,
        vec![Operation::Weaken, Operation::Grow, Operation::Weaken, Operation::Hack]
    );
}
