//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the store, scheduler and conflict rules into task
//!   lifecycle operations.
//! - Keep CLI and embedding callers decoupled from storage and delivery.

pub mod error;
pub mod events;
pub mod lifecycle;
