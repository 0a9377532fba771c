//! Reminder-delivery facilities.
//!
//! # Responsibility
//! - Define the boundary to the platform that actually delivers reminders.
//! - Ship a process-local facility and a durable SQLite outbox.
//!
//! # Invariants
//! - Facilities never read or write the task store.

pub mod facility;
pub mod outbox;
