//! Environment registry lookup.
//!
//! # Responsibilities
//! - Name the currently active OCM environment
//! - Resolve the endpoint URLs that environment exposes
//!
//! # Design Decisions
//! - The registry is an injected capability; configuration loading never
//!   reaches for a process-wide default
//! - A missing endpoint is `None`, not an error; callers decide severity

pub mod builtin;

use std::collections::HashMap;
use thiserror::Error;

pub use builtin::BuiltinRegistry;

/// Kinds of endpoint an environment may register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// The OCM API itself.
    Api,
    /// The backplane API fronting cluster access.
    Backplane,
}

/// A named remote environment and the endpoints it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    name: String,
    endpoints: HashMap<EndpointKind, String>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoints: HashMap::new(),
        }
    }

    /// Register an endpoint, replacing any previous URL of the same kind.
    pub fn with_endpoint(mut self, kind: EndpointKind, url: impl Into<String>) -> Self {
        self.endpoints.insert(kind, url.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL registered for `kind`, if any.
    pub fn endpoint_url(&self, kind: EndpointKind) -> Option<&str> {
        self.endpoints.get(&kind).map(String::as_str)
    }
}

/// Errors raised while determining the active environment.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown OCM environment: {0}")]
    UnknownEnvironment(String),
}

/// Source of the active environment.
pub trait EnvironmentRegistry {
    fn active_environment(&self) -> Result<Environment, RegistryError>;
}

impl<R: EnvironmentRegistry + ?Sized> EnvironmentRegistry for &R {
    fn active_environment(&self) -> Result<Environment, RegistryError> {
        (**self).active_environment()
    }
}
