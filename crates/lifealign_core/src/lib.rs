//! Core task scheduling and reminder engine for LifeAlign.
//! This crate is the single source of truth for task and reminder invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod schedule;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{
    default_log_level, init_logging, init_logging_with_config, logging_status, LoggingError,
};
pub use model::reminder::{ReminderAction, ReminderHandle, ReminderInstant};
pub use model::task::{
    AlertType, Category, ClockTime, NewTask, Recurrence, RepeatPeriod, Task, TaskId, TaskPatch,
    TaskValidationError, TimeRange,
};
pub use reminder::facility::{
    FacilityError, FacilityResult, InMemoryReminderFacility, ReminderFacility,
};
pub use reminder::outbox::SqliteReminderOutbox;
pub use repo::kv_store::{KeyValueStore, KvError, MemoryKeyValueStore, SqliteKeyValueStore};
pub use repo::task_store::{StoreError, StoreResult, TaskStore};
pub use schedule::conflict::{find_conflicts, has_conflict, Candidate, ConflictScope};
pub use schedule::planner::plan;
pub use schedule::scheduler::ReminderScheduler;
pub use service::error::{TaskError, TaskResult};
pub use service::events::TaskEvent;
pub use service::lifecycle::{
    ConflictResolution, HistoryOrder, ReminderActionOutcome, TaskLifecycleController,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
