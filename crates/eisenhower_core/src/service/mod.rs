//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers decoupled from storage details.
//!
//! # Invariants
//! - Services are stateless values built per call site; the store is the
//!   only shared state.
//! - Cross-service dependencies are passed in explicitly.

pub mod settings_service;
pub mod task_service;
pub mod transfer_service;
