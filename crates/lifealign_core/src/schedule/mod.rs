//! Scheduling core: reminder planning, reminder lifecycle and conflicts.
//!
//! # Responsibility
//! - Keep time arithmetic and overlap rules out of the service layer.
//!
//! # Invariants
//! - `planner` and `conflict` are pure; only `scheduler` performs I/O.

pub mod conflict;
pub mod planner;
pub mod scheduler;
