//! Lambda runtime integration for the handler exercises.
//!
//! This crate owns hosting-runtime details (context conversion, environment
//! configuration, per-process warm state) and one binary per exercise. The
//! handler logic itself lives in `exercises_core`.

pub mod config;
pub mod runtime;
