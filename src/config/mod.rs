//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → config file (JSON, $BACKPLANE_CONFIG or ~/.config/backplane/config.json)
//!     → environment overrides (HTTPS_PROXY)
//!     → settings.rs (pure merge)
//!     → validation.rs (hard errors vs warnings)
//!     → loader.rs (base URL resolution, proxy selection)
//!     → BackplaneConfiguration (immutable, one per invocation)
//! ```
//!
//! # Design Decisions
//! - No global settings store; every layer is an explicit argument
//! - A missing config file is normal, a malformed one is fatal
//! - Nothing is cached or persisted between invocations

pub mod loader;
pub mod schema;
pub mod settings;
pub mod validation;

pub use loader::{
    config_directory, config_file_path, load_configuration, resolve_base_url, ConfigError,
    LoadOptions,
};
pub use schema::{AccessRequestsJiraConfiguration, BackplaneConfiguration, JiraTransitionsNames};
pub use settings::{EnvSnapshot, Settings};
pub use validation::{
    validate_config, ConfigWarning, ValidationError, ValidationPolicy, ValidationReport,
};
