//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy qualification (probe.rs):
//!     Candidate proxy
//!     → GET <backplane-url>/healthz through that proxy
//!     → status code or probe error
//!
//! Connectivity self-test (connectivity.rs):
//!     Effective configuration
//!     → HEAD <backplane-url> through the selected proxy
//!     → reachable or error
//! ```
//!
//! # Design Decisions
//! - Every attempt is bounded by a fixed timeout and never retried
//! - Each probe builds its own client so proxy bindings never leak
//! - The probe is a trait so selection logic can be tested offline

pub mod connectivity;
pub mod probe;

use std::time::Duration;

pub use connectivity::ConnectivityError;
pub use probe::{HttpProbe, ProbeError, ProxyProbe};

/// Upper bound for one health probe or connectivity check.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
