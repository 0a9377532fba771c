//! Error taxonomy surfaced by the lifecycle controller.

use crate::model::reminder::ReminderHandle;
use crate::model::task::{ClockTime, TaskId, TaskValidationError};
use crate::repo::task_store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskResult<T> = Result<T, TaskError>;

#[derive(Debug)]
pub enum TaskError {
    /// `end` precedes `start`.
    InvalidTimeRange { start: ClockTime, end: ClockTime },
    /// Any other input rejection (empty title, bad recurrence).
    Validation(TaskValidationError),
    /// The requested slot overlaps existing tasks. Nothing was committed.
    ConflictDetected { conflicting: Vec<TaskId> },
    TaskNotFound(TaskId),
    ReminderNotFound(ReminderHandle),
    Storage(StoreError),
}

impl TaskError {
    /// Stable machine-readable code used in log lines and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTimeRange { .. } => "invalid_time_range",
            Self::Validation(_) => "validation_error",
            Self::ConflictDetected { .. } => "conflict_detected",
            Self::TaskNotFound(_) => "task_not_found",
            Self::ReminderNotFound(_) => "reminder_not_found",
            Self::Storage(_) => "storage_error",
        }
    }
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeRange { start, end } => {
                write!(f, "end time {end} cannot be before start time {start}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::ConflictDetected { conflicting } => write!(
                f,
                "time slot conflicts with {} existing task(s)",
                conflicting.len()
            ),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ReminderNotFound(handle) => write!(f, "no task owns reminder `{handle}`"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for TaskError {
    fn from(value: TaskValidationError) -> Self {
        match value {
            TaskValidationError::InvalidTimeRange { start, end } => {
                Self::InvalidTimeRange { start, end }
            }
            other => Self::Validation(other),
        }
    }
}

impl From<StoreError> for TaskError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}
