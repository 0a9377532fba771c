//! Time-range conflict detection.
//!
//! # Responsibility
//! - Decide whether a candidate time range overlaps existing tasks.
//!
//! # Invariants
//! - Ranges are compared as time of day only.
//! - A start point is tested against `[start, end)` and an end point against
//!   `(start, end]`, in both directions. Back-to-back ranges never conflict;
//!   containment always does.
//! - The result is symmetric in the two ranges.

use crate::model::task::{ClockTime, Task, TaskId, TimeRange};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which existing tasks a candidate is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    /// Only tasks on the candidate's date.
    #[default]
    SameDay,
    /// Every task regardless of date.
    AnyDate,
}

/// Time slot proposed by a create or update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub date: NaiveDate,
    pub range: TimeRange,
}

impl Candidate {
    pub fn of(task: &Task) -> Self {
        Self {
            date: task.date,
            range: task.time_range(),
        }
    }
}

/// Whether two time-of-day ranges conflict.
pub fn ranges_conflict(a: TimeRange, b: TimeRange) -> bool {
    starts_within(a.start, b)
        || ends_within(a.end, b)
        || starts_within(b.start, a)
        || ends_within(b.end, a)
}

fn starts_within(point: ClockTime, range: TimeRange) -> bool {
    range.start <= point && point < range.end
}

fn ends_within(point: ClockTime, range: TimeRange) -> bool {
    range.start < point && point <= range.end
}

/// Ids of existing tasks that conflict with `candidate`, in input order.
pub fn find_conflicts(
    candidate: &Candidate,
    existing: &[Task],
    exclude_task_id: Option<TaskId>,
    scope: ConflictScope,
) -> Vec<TaskId> {
    existing
        .iter()
        .filter(|task| Some(task.id) != exclude_task_id)
        .filter(|task| match scope {
            ConflictScope::SameDay => task.date == candidate.date,
            ConflictScope::AnyDate => true,
        })
        .filter(|task| ranges_conflict(candidate.range, task.time_range()))
        .map(|task| task.id)
        .collect()
}

/// Whether `candidate` conflicts with any existing task.
pub fn has_conflict(
    candidate: &Candidate,
    existing: &[Task],
    exclude_task_id: Option<TaskId>,
    scope: ConflictScope,
) -> bool {
    !find_conflicts(candidate, existing, exclude_task_id, scope).is_empty()
}
