//! Domain model for tasks and their reminders.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep parsing of user-facing tags (categories, alert types) in one place.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion moves a copy into history; active records carry no tombstone.

pub mod reminder;
pub mod task;
