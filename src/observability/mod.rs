//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`
//! - Logs go to stderr so command output on stdout stays machine-readable

pub mod logging;
