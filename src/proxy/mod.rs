//! Egress proxy selection.
//!
//! # Data Flow
//! ```text
//! proxy-url candidates (ordered)
//!     → parse each candidate, skipping malformed entries
//!     → health probe through the candidate
//!     → first HTTP 200 in list order wins
//!     → otherwise the first candidate, verbatim
//! ```
//!
//! # Design Decisions
//! - List order decides, never response order
//! - The fallback keeps a configured proxy rather than silently going direct
//! - An empty list selects nothing and makes no network call

pub mod selector;

pub use selector::{
    health_check_target, parse_candidate, CandidateError, ProbeStrategy, ProxySelector,
};
