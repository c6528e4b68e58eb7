//! Runtime-agnostic handler exercises.
//!
//! This crate owns the handler logic and the invocation contract. It
//! intentionally excludes the Lambda runtime; `exercises_lambda` adapts these
//! handlers to a hosting runtime.

pub mod cold_start;
pub mod contract;
pub mod error;
pub mod fetch;
pub mod greeting;
pub mod scheduling;
