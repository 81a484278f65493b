//! Configuration schema definitions.
//!
//! This module defines the effective configuration handed to every command,
//! together with the ticketing sub-configuration and its built-in defaults.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::info::DEFAULT_SESSION_DIRECTORY;

/// Default name of the production OCM environment.
pub const PROD_ENV_NAME_DEFAULT: &str = "production";

/// Default JIRA instance used for access requests.
pub const JIRA_BASE_URL_DEFAULT: &str = "https://issues.redhat.com";

/// Transition names applied to an access-request issue over its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct JiraTransitionsNames {
    #[serde(default)]
    pub on_creation: String,
    #[serde(default)]
    pub on_approval: String,
    #[serde(default)]
    pub on_error: String,
}

impl JiraTransitionsNames {
    fn new(on_creation: &str, on_approval: &str, on_error: &str) -> Self {
        Self {
            on_creation: on_creation.to_string(),
            on_approval: on_approval.to_string(),
            on_error: on_error.to_string(),
        }
    }
}

/// JIRA settings for access requests.
///
/// A missing field deserializes to its empty value; the whole object replaces
/// the built-in default rather than merging into it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccessRequestsJiraConfiguration {
    #[serde(default)]
    pub default_project: String,
    #[serde(default)]
    pub default_issue_type: String,
    #[serde(default)]
    pub prod_project: String,
    #[serde(default)]
    pub prod_issue_type: String,
    #[serde(default)]
    pub project_to_transitions_names: BTreeMap<String, JiraTransitionsNames>,
}

impl AccessRequestsJiraConfiguration {
    /// Projects referenced as default or production that have no transitions entry.
    pub fn projects_missing_transitions(&self) -> Vec<&str> {
        [self.default_project.as_str(), self.prod_project.as_str()]
            .into_iter()
            .filter(|project| !self.project_to_transitions_names.contains_key(*project))
            .collect()
    }
}

impl Default for AccessRequestsJiraConfiguration {
    fn default() -> Self {
        let mut transitions = BTreeMap::new();
        transitions.insert(
            "SDAINT".to_string(),
            JiraTransitionsNames::new("In Progress", "In Progress", "Closed"),
        );
        transitions.insert(
            "OHSS".to_string(),
            JiraTransitionsNames::new("Pending Customer", "New", "Cancelled"),
        );

        Self {
            default_project: "SDAINT".to_string(),
            default_issue_type: "Story".to_string(),
            prod_project: "OHSS".to_string(),
            prod_issue_type: "Incident".to_string(),
            project_to_transitions_names: transitions,
        }
    }
}

/// Effective configuration for one command invocation.
///
/// Built once by [`crate::config::load_configuration`] and read-only after
/// that. Secrets are redacted when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackplaneConfiguration {
    pub(crate) url: String,
    pub(crate) proxy_url: Option<String>,
    #[serde(rename = "session-dir")]
    pub(crate) session_directory: String,
    pub(crate) assume_initial_arn: String,
    pub(crate) prod_env_name: String,
    #[serde(rename = "pd-key", serialize_with = "redact_optional")]
    pub(crate) pagerduty_api_key: Option<String>,
    pub(crate) jira_base_url: String,
    #[serde(serialize_with = "redact")]
    pub(crate) jira_token: String,
    #[serde(rename = "jira-config-for-access-requests")]
    pub(crate) jira_config: AccessRequestsJiraConfiguration,
}

impl BackplaneConfiguration {
    /// A configuration pointing at `url` with every optional field defaulted.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            proxy_url: None,
            session_directory: String::new(),
            assume_initial_arn: String::new(),
            prod_env_name: PROD_ENV_NAME_DEFAULT.to_string(),
            pagerduty_api_key: None,
            jira_base_url: JIRA_BASE_URL_DEFAULT.to_string(),
            jira_token: String::new(),
            jira_config: AccessRequestsJiraConfiguration::default(),
        }
    }

    pub fn with_proxy_url(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url;
        self
    }

    /// Backplane API base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Proxy selected by health checking, if any candidate was configured.
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    /// Session directory; empty means the caller applies its own default.
    pub fn session_directory(&self) -> &str {
        &self.session_directory
    }

    /// Session directory, falling back to `~/backplane` when unset.
    pub fn session_directory_or_default(&self, home: &Path) -> PathBuf {
        if self.session_directory.is_empty() {
            home.join(DEFAULT_SESSION_DIRECTORY)
        } else {
            PathBuf::from(&self.session_directory)
        }
    }

    pub fn assume_initial_arn(&self) -> &str {
        &self.assume_initial_arn
    }

    pub fn prod_env_name(&self) -> &str {
        &self.prod_env_name
    }

    pub fn pagerduty_api_key(&self) -> Option<&str> {
        self.pagerduty_api_key.as_deref()
    }

    pub fn jira_base_url(&self) -> &str {
        &self.jira_base_url
    }

    pub fn jira_token(&self) -> &str {
        &self.jira_token
    }

    pub fn jira_config(&self) -> &AccessRequestsJiraConfiguration {
        &self.jira_config
    }
}

fn redact<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("<redacted>")
    }
}

fn redact_optional<S: Serializer>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => redact(v, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_jira_config_is_consistent() {
        let config = AccessRequestsJiraConfiguration::default();
        assert!(config.projects_missing_transitions().is_empty());
        assert_eq!(config.project_to_transitions_names.len(), 2);
        assert_eq!(
            config.project_to_transitions_names["OHSS"].on_approval,
            "New"
        );
    }

    #[test]
    fn test_missing_transitions_reported() {
        let config: AccessRequestsJiraConfiguration = serde_json::from_value(serde_json::json!({
            "default-project": "X",
            "prod-project": "OHSS",
            "project-to-transitions-names": {
                "OHSS": { "on-creation": "a", "on-approval": "b", "on-error": "c" }
            }
        }))
        .unwrap();

        assert_eq!(config.projects_missing_transitions(), vec!["X"]);
    }

    #[test]
    fn test_session_directory_default() {
        let mut config = BackplaneConfiguration::new("https://bp.example.test");
        assert_eq!(
            config.session_directory_or_default(Path::new("/home/op")),
            PathBuf::from("/home/op/backplane")
        );

        config.session_directory = "/data/sessions".to_string();
        assert_eq!(
            config.session_directory_or_default(Path::new("/home/op")),
            PathBuf::from("/data/sessions")
        );
    }

    #[test]
    fn test_serialize_redacts_secrets() {
        let mut config = BackplaneConfiguration::new("https://bp.example.test");
        config.jira_token = "secret".to_string();
        config.pagerduty_api_key = Some("pd-secret".to_string());

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["jira-token"], "<redacted>");
        assert_eq!(json["pd-key"], "<redacted>");
        assert_eq!(json["url"], "https://bp.example.test");
        assert!(json["proxy-url"].is_null());
    }
}
