//! Backplane CLI configuration core.
//!
//! Resolves the effective configuration of one `ocm-backplane` invocation:
//! layered settings, backplane URL lookup, health-checked proxy selection
//! and validation.

pub mod config;
pub mod health;
pub mod info;
pub mod observability;
pub mod proxy;
pub mod registry;

pub use config::{load_configuration, BackplaneConfiguration, ConfigError, LoadOptions};
pub use health::HttpProbe;
pub use registry::{BuiltinRegistry, EnvironmentRegistry};
