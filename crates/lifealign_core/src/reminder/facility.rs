//! Reminder-delivery facility contract.
//!
//! # Responsibility
//! - Define how the engine asks a platform to arrange and void reminders.
//! - Provide a process-local facility for embedding callers and tests.
//!
//! # Invariants
//! - Every successful `arrange` returns a handle unique within the facility.
//! - `void` of an unknown or already-voided handle is not an error.

use crate::db::DbError;
use crate::model::reminder::{ReminderHandle, ReminderInstant};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

pub type FacilityResult<T> = Result<T, FacilityError>;

/// Failure reported by a reminder facility.
#[derive(Debug)]
pub enum FacilityError {
    /// The facility refused this reminder (permission, quota, past instant).
    Rejected(String),
    /// The facility could not be reached.
    Unavailable(String),
    Db(DbError),
}

impl Display for FacilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(message) => write!(f, "reminder rejected: {message}"),
            Self::Unavailable(message) => write!(f, "reminder facility unavailable: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FacilityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for FacilityError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for FacilityError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// External facility that delivers reminders at a wall-clock instant.
#[async_trait]
pub trait ReminderFacility: Send + Sync {
    async fn arrange(&self, fire_at: NaiveDateTime, message: &str)
        -> FacilityResult<ReminderHandle>;
    async fn void(&self, handle: &ReminderHandle) -> FacilityResult<()>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    next_seq: u64,
    pending: BTreeMap<ReminderHandle, ReminderInstant>,
}

/// Process-local facility that keeps arranged reminders in memory.
///
/// Handles are `reminder-<n>` with a per-facility counter.
#[derive(Debug, Default)]
pub struct InMemoryReminderFacility {
    state: Mutex<InMemoryState>,
}

impl InMemoryReminderFacility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reminders arranged and not yet voided or delivered, by handle.
    pub fn pending(&self) -> Vec<(ReminderHandle, ReminderInstant)> {
        self.with_state(|state| {
            state
                .pending
                .iter()
                .map(|(handle, instant)| (handle.clone(), instant.clone()))
                .collect()
        })
    }

    pub fn pending_count(&self) -> usize {
        self.with_state(|state| state.pending.len())
    }

    pub fn is_pending(&self, handle: &ReminderHandle) -> bool {
        self.with_state(|state| state.pending.contains_key(handle))
    }

    /// Removes and returns every reminder with `fire_at <= now`, earliest first.
    pub fn take_due(&self, now: NaiveDateTime) -> Vec<(ReminderHandle, ReminderInstant)> {
        self.with_state(|state| {
            let due_handles: Vec<ReminderHandle> = state
                .pending
                .iter()
                .filter(|(_, instant)| instant.fire_at <= now)
                .map(|(handle, _)| handle.clone())
                .collect();
            let mut due: Vec<(ReminderHandle, ReminderInstant)> = due_handles
                .into_iter()
                .filter_map(|handle| {
                    state
                        .pending
                        .remove(&handle)
                        .map(|instant| (handle, instant))
                })
                .collect();
            due.sort_by_key(|(_, instant)| instant.fire_at);
            due
        })
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut InMemoryState) -> T) -> T {
        match self.state.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

#[async_trait]
impl ReminderFacility for InMemoryReminderFacility {
    async fn arrange(
        &self,
        fire_at: NaiveDateTime,
        message: &str,
    ) -> FacilityResult<ReminderHandle> {
        Ok(self.with_state(|state| {
            state.next_seq += 1;
            let handle = ReminderHandle::new(format!("reminder-{}", state.next_seq));
            state.pending.insert(
                handle.clone(),
                ReminderInstant {
                    fire_at,
                    message: message.to_string(),
                },
            );
            handle
        }))
    }

    async fn void(&self, handle: &ReminderHandle) -> FacilityResult<()> {
        self.with_state(|state| {
            state.pending.remove(handle);
        });
        Ok(())
    }
}
