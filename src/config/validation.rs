//! Configuration validation.
//!
//! # Responsibilities
//! - Require a proxy, from the config file or `HTTPS_PROXY`
//! - Flag deprecated and inconsistent settings as warnings
//!
//! # Design Decisions
//! - Validation is a pure function over the merged settings
//! - Warnings are collected and logged, never fatal
//! - A missing proxy is fatal unless the caller opts into `WarnOnly`

use thiserror::Error;

use crate::config::settings::{
    Settings, JIRA_CONFIG_FOR_ACCESS_REQUESTS_KEY, PAGERDUTY_KEY, PROXY_URL_KEY, URL_KEY,
};

/// How strictly a missing proxy is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Abort resolution when no proxy is configured.
    #[default]
    FailFast,
    /// Report a missing proxy as a warning.
    ///
    /// Intended for test suites and staged migrations that run without a
    /// proxy; production callers should keep `FailFast`.
    WarnOnly,
}

/// Hard validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "proxy-url must be set explicitly in either config file or via the environment HTTPS_PROXY"
    )]
    MissingProxy,
}

/// Non-fatal findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Proxy missing under [`ValidationPolicy::WarnOnly`].
    MissingProxy,
    /// The config file sets the deprecated `url` key.
    DeprecatedUrlKey,
    /// The access-request JIRA table could not be decoded.
    MalformedJiraConfig(String),
    /// A default or production project has no transitions entry.
    MissingJiraTransitions(String),
    /// No PagerDuty key; only `login --pd` is affected.
    MissingPagerDutyKey,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingProxy => write!(f, "{}", ValidationError::MissingProxy),
            ConfigWarning::DeprecatedUrlKey => f.write_str(concat!(
                "Manual URL configuration is deprecated, ",
                "please remove URL key from Backplane configuration"
            )),
            ConfigWarning::MalformedJiraConfig(e) => write!(
                f,
                "failed to unmarshal '{}' entry as json: {}",
                JIRA_CONFIG_FOR_ACCESS_REQUESTS_KEY, e
            ),
            ConfigWarning::MissingJiraTransitions(project) => write!(
                f,
                "'{}' is inconsistent: no transitions defined for project '{}'",
                JIRA_CONFIG_FOR_ACCESS_REQUESTS_KEY, project
            ),
            ConfigWarning::MissingPagerDutyKey => f.write_str(concat!(
                "No PagerDuty API Key configuration available. ",
                "This will result in failure of `ocm-backplane login --pd <incident-id>` command."
            )),
        }
    }
}

/// Warnings gathered by a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<ConfigWarning>,
}

impl ValidationReport {
    pub fn has_warning(&self, warning: &ConfigWarning) -> bool {
        self.warnings.contains(warning)
    }

    /// Emit each warning through `tracing`.
    pub fn log(&self) {
        for warning in &self.warnings {
            match warning {
                ConfigWarning::MissingPagerDutyKey => tracing::info!("{}", warning),
                _ => tracing::warn!("{}", warning),
            }
        }
    }
}

/// Validate raw settings before URL and proxy resolution.
///
/// The proxy requirement is checked on the merged candidate list, so a
/// `HTTPS_PROXY` that yields no candidates does not satisfy it.
pub fn validate_config(
    settings: &Settings,
    policy: ValidationPolicy,
) -> Result<ValidationReport, ValidationError> {
    let mut report = ValidationReport::default();

    if settings.get_string_slice(PROXY_URL_KEY).is_empty() {
        match policy {
            ValidationPolicy::FailFast => return Err(ValidationError::MissingProxy),
            ValidationPolicy::WarnOnly => report.warnings.push(ConfigWarning::MissingProxy),
        }
    }

    if !settings.get_string(URL_KEY).is_empty() {
        report.warnings.push(ConfigWarning::DeprecatedUrlKey);
    }

    match settings.jira_config() {
        Ok(jira) => {
            for project in jira.projects_missing_transitions() {
                report
                    .warnings
                    .push(ConfigWarning::MissingJiraTransitions(project.to_string()));
            }
        }
        Err(e) => report
            .warnings
            .push(ConfigWarning::MalformedJiraConfig(e.to_string())),
    }

    if settings.get_string(PAGERDUTY_KEY).is_empty() {
        report.warnings.push(ConfigWarning::MissingPagerDutyKey);
    }

    Ok(report)
}
