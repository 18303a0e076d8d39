//! Domain model for the task matrix.
//!
//! # Responsibility
//! - Define canonical task, settings and snapshot shapes.
//! - Own validation rules shared by every write path.
//!
//! # Invariants
//! - Every task is identified by a store-assigned `TaskId`.
//! - Validation happens before any store mutation.

pub mod settings;
pub mod snapshot;
pub mod task;
