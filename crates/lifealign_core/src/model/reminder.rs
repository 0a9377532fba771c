//! Reminder value types shared by the planner, scheduler and controller.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque handle returned by a reminder facility for one arranged reminder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderHandle(String);

impl ReminderHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ReminderHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ReminderHandle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ReminderHandle {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One planned reminder. Ephemeral; never persisted by the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderInstant {
    /// Local wall-clock delivery instant.
    pub fire_at: NaiveDateTime,
    pub message: String,
}

/// User response attached to a delivered reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderAction {
    Complete,
    PushToTomorrow,
    Delete,
    /// Open the task in an editor; never mutates.
    Edit,
}

impl ReminderAction {
    pub fn as_identifier(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::PushToTomorrow => "tomorrow",
            Self::Delete => "delete",
            Self::Edit => "edit",
        }
    }

    /// Maps a notification action identifier to an action.
    pub fn from_identifier(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "complete" | "done" => Some(Self::Complete),
            "tomorrow" | "push_to_tomorrow" => Some(Self::PushToTomorrow),
            "delete" => Some(Self::Delete),
            "edit" => Some(Self::Edit),
            _ => None,
        }
    }
}
