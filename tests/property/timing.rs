use std::time::Duration;

use proptest::prelude::*;

use batchfleet::batch::{BatchTiming, OperationDurations};

proptest! {
    #[test]
    fn waits_are_never_shorter_than_the_gap(
        weaken in 0u64..100_000,
        grow in 0u64..100_000,
        hack in 0u64..100_000,
        gap in 1u64..5_000,
    ) {
        let d = OperationDurations {
            weaken: Duration::from_millis(weaken),
            grow: Duration::from_millis(grow),
            hack: Duration::from_millis(hack),
        };
        let gap = Duration::from_millis(gap);
        let timing = BatchTiming::compute(&d, gap);

        for wait in timing.inter_operation_waits() {
            prop_assert!(wait >= gap);
        }
        for pair in timing.complete_at.windows(2) {
            prop_assert!(pair[1] >= pair[0] + gap, "{:?}", timing.complete_at);
        }
        prop_assert!(timing.cycle_length() >= d.longest());
        prop_assert_eq!(timing.complete_at[0], d.longest());
    }

    #[test]
    fn equal_durations_degenerate_to_gap_spacing(
        d in 0u64..100_000,
        gap in 1u64..5_000,
    ) {
        let d = Duration::from_millis(d);
        let gap = Duration::from_millis(gap);
        let timing = BatchTiming::compute(
            &OperationDurations { weaken: d, grow: d, hack: d },
            gap,
        );
        prop_assert_eq!(timing.inter_operation_waits(), [gap, gap, gap]);
    }
}
