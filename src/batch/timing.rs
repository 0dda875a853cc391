// src/batch/timing.rs

//! Pure computation of when each phase of a batch is issued.
//!
//! Every phase is issued strictly after the previous one and the scheduler
//! never waits for completion signals, so ordering comes entirely from the
//! offsets computed here:
//!
//! - `Weaken1` is delayed so it completes exactly when the longest operation
//!   would.
//! - Each following phase waits `max(gap, previous duration + gap - own
//!   duration)` after the previous issue. With the longest operation first
//!   this is `(longest - own duration) + gap`.
//! - Hence every completion lands at least `gap` after the previous one and
//!   every inter-operation wait is at least `gap`, whatever the durations.

use std::time::Duration;

use crate::batch::phase::BatchPhase;
use crate::types::Operation;

/// Durations of the three operations against one target, read at planning
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDurations {
    pub weaken: Duration,
    pub grow: Duration,
    pub hack: Duration,
}

impl OperationDurations {
    pub fn of(&self, op: Operation) -> Duration {
        match op {
            Operation::Weaken => self.weaken,
            Operation::Grow => self.grow,
            Operation::Hack => self.hack,
        }
    }

    pub fn longest(&self) -> Duration {
        self.weaken.max(self.grow).max(self.hack)
    }
}

/// Issue and completion offsets of one batch, relative to the cycle start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTiming {
    /// Minimum spacing between completions.
    pub gap: Duration,
    /// When each phase is issued, indexed by [`BatchPhase::index`].
    pub issue_at: [Duration; 4],
    /// When each phase is expected to complete.
    pub complete_at: [Duration; 4],
}

impl BatchTiming {
    pub fn compute(durations: &OperationDurations, gap: Duration) -> Self {
        let longest = durations.longest();
        let d = BatchPhase::CYCLE.map(|phase| durations.of(phase.operation()));

        let mut issue_at = [Duration::ZERO; 4];
        let mut complete_at = [Duration::ZERO; 4];

        issue_at[0] = longest.saturating_sub(d[0]);
        complete_at[0] = issue_at[0] + d[0];

        for i in 1..4 {
            let wait = (d[i - 1] + gap).saturating_sub(d[i]).max(gap);
            issue_at[i] = issue_at[i - 1] + wait;
            complete_at[i] = issue_at[i] + d[i];
        }

        Self {
            gap,
            issue_at,
            complete_at,
        }
    }

    /// Delay from the cycle start until `Weaken1` is issued.
    pub fn initial_delay(&self) -> Duration {
        self.issue_at[0]
    }

    /// Wait between issuing `phase` and issuing the phase after it.
    ///
    /// For [`BatchPhase::Hack`] this is the settle time until the cycle ends.
    pub fn wait_after(&self, phase: BatchPhase) -> Duration {
        let i = phase.index();
        if i + 1 < 4 {
            self.issue_at[i + 1] - self.issue_at[i]
        } else {
            self.cycle_length() - self.issue_at[i]
        }
    }

    /// The three waits between consecutive issues.
    pub fn inter_operation_waits(&self) -> [Duration; 3] {
        [
            self.wait_after(BatchPhase::Weaken1),
            self.wait_after(BatchPhase::Grow),
            self.wait_after(BatchPhase::Weaken2),
        ]
    }

    /// Cycle length: the last completion plus one gap. Never shorter than
    /// the longest operation.
    pub fn cycle_length(&self) -> Duration {
        self.complete_at[3] + self.gap
    }
}
