//! Infrastructure adapters. Implement ports.
//!
//! Workflow HTTP API, local filesystem, console transport. Map errors to DomainError.

pub mod console;
pub mod persistence;
pub mod workflow;
