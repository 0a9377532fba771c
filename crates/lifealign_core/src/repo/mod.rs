//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value contract the engine persists through.
//! - Isolate JSON and SQLite details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Task::validate()` before persistence.
//! - Repository APIs return semantic errors (`InvalidData`) in addition to
//!   transport errors.

pub mod kv_store;
pub mod task_store;
