//! Layered settings: defaults, file contents and environment overrides.
//!
//! # Responsibilities
//! - Seed defaults for the optional keys
//! - Overlay the JSON config file
//! - Overlay the bound environment variables
//!
//! # Design Decisions
//! - Merging is a pure function of its three inputs; no process-wide state
//! - Top-level keys replace wholesale, nested objects are never deep-merged
//! - Empty or blank environment values count as unset

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::config::schema::{
    AccessRequestsJiraConfiguration, JIRA_BASE_URL_DEFAULT, PROD_ENV_NAME_DEFAULT,
};
use crate::info::{BACKPLANE_CONFIG_PATH_ENV, BACKPLANE_PROXY_ENV, BACKPLANE_URL_ENV};

pub const URL_KEY: &str = "url";
pub const PROXY_URL_KEY: &str = "proxy-url";
pub const SESSION_DIR_KEY: &str = "session-dir";
pub const ASSUME_INITIAL_ARN_KEY: &str = "assume-initial-arn";
pub const PROD_ENV_NAME_KEY: &str = "prod-env-name";
pub const PAGERDUTY_KEY: &str = "pd-key";
pub const JIRA_BASE_URL_KEY: &str = "jira-base-url";
pub const JIRA_TOKEN_KEY: &str = "jira-token";
pub const JIRA_CONFIG_FOR_ACCESS_REQUESTS_KEY: &str = "jira-config-for-access-requests";

/// Environment variables bound to config keys, taking precedence over the file.
pub const ENV_BINDINGS: &[(&str, &str)] = &[(PROXY_URL_KEY, BACKPLANE_PROXY_ENV)];

/// Snapshot of the environment variables the loader consults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the relevant variables from the current process.
    pub fn from_process() -> Self {
        Self::from_pairs(
            [BACKPLANE_URL_ENV, BACKPLANE_PROXY_ENV, BACKPLANE_CONFIG_PATH_ENV]
                .into_iter()
                .filter_map(|name| std::env::var(name).ok().map(|value| (name, value))),
        )
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `name`, or `None` when unset, empty or only whitespace.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Merged key/value view of every configuration layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    merged: Map<String, Value>,
}

impl Settings {
    /// Built-in values for the optional keys.
    pub fn defaults() -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert(PROD_ENV_NAME_KEY.into(), Value::from(PROD_ENV_NAME_DEFAULT));
        defaults.insert(JIRA_BASE_URL_KEY.into(), Value::from(JIRA_BASE_URL_DEFAULT));
        // Serializing a plain struct of strings and maps cannot fail.
        let jira = serde_json::to_value(AccessRequestsJiraConfiguration::default())
            .unwrap_or(Value::Null);
        defaults.insert(JIRA_CONFIG_FOR_ACCESS_REQUESTS_KEY.into(), jira);
        defaults
    }

    /// Merge the layers, highest precedence last: defaults, file, environment.
    pub fn merge(
        defaults: Map<String, Value>,
        file: Option<Map<String, Value>>,
        env: &EnvSnapshot,
    ) -> Self {
        let mut merged = defaults;

        for (key, value) in file.unwrap_or_default() {
            merged.insert(key, value);
        }

        for (key, var) in ENV_BINDINGS {
            if let Some(value) = env.get(var) {
                tracing::debug!(key = %key, env = %var, "Config key bound from environment");
                merged.insert((*key).to_string(), Value::from(value));
            }
        }

        Self { merged }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.merged.get(key)
    }

    /// String form of `key`; empty when absent or not a scalar.
    pub fn get_string(&self, key: &str) -> String {
        self.get(key).map(scalar_to_string).unwrap_or_default()
    }

    /// List form of `key`.
    ///
    /// A string is split on whitespace, an array yields its scalar elements.
    pub fn get_string_slice(&self, key: &str) -> Vec<String> {
        self.get(key).map(value_to_slice).unwrap_or_default()
    }

    /// Decode the access-request JIRA table.
    pub fn jira_config(&self) -> Result<AccessRequestsJiraConfiguration, serde_json::Error> {
        let value = self
            .get(JIRA_CONFIG_FOR_ACCESS_REQUESTS_KEY)
            .cloned()
            .unwrap_or(Value::Null);
        serde_json::from_value(value)
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn value_to_slice(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
