//! Check-execution pipeline: config loading and defaulting, validation,
//! expectation matching, the per-cycle runner, reporting and scheduling.
pub mod config;
pub mod error;
pub mod matcher;
pub mod reporter;
pub mod runner;
pub mod scheduler;
pub mod validation;
