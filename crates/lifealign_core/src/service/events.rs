//! Change notifications emitted after successful mutations.

use crate::model::task::{Task, TaskId};

/// One committed change to the task set.
///
/// Subscribers that lag behind the channel capacity miss events and should
/// re-read the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Created(Task),
    Updated(Task),
    Deleted { id: TaskId },
}

impl TaskEvent {
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::Created(task) | Self::Updated(task) => task.id,
            Self::Deleted { id } => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Deleted { .. } => "deleted",
        }
    }
}
