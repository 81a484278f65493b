//! Configuration loading and resolution.
//!
//! Runs the full pipeline: locate and read the config file, merge layers,
//! validate, resolve the backplane URL, pick a proxy and assemble the
//! effective configuration.

use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::time;

use crate::config::schema::BackplaneConfiguration;
use crate::config::settings::{
    EnvSnapshot, Settings, ASSUME_INITIAL_ARN_KEY, JIRA_BASE_URL_KEY, JIRA_TOKEN_KEY,
    PAGERDUTY_KEY, PROD_ENV_NAME_KEY, PROXY_URL_KEY, SESSION_DIR_KEY, URL_KEY,
};
use crate::config::validation::{validate_config, ValidationError, ValidationPolicy};
use crate::health::ProxyProbe;
use crate::info::{
    BACKPLANE_CONFIG_PATH_ENV, BACKPLANE_URL_ENV, CONFIG_DEFAULT_DIR, CONFIG_DEFAULT_FILE_NAME,
};
use crate::proxy::{ProbeStrategy, ProxySelector};
use crate::registry::{EndpointKind, EnvironmentRegistry, RegistryError};

/// Fatal errors of configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine the user's home directory")]
    HomeDirUnavailable,

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("the requested API endpoint is not available for the OCM environment: {environment}")]
    EndpointUnavailable { environment: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("configuration resolution did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}

/// Knobs for one resolution.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub validation: ValidationPolicy,
    pub probe_strategy: ProbeStrategy,
    /// Bound on the whole resolution, proxy probing included.
    pub deadline: Option<Duration>,
}

/// Config file location given the environment and home directory.
pub fn resolve_config_path(
    env: &EnvSnapshot,
    home: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = env.get(BACKPLANE_CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    let home = home.ok_or(ConfigError::HomeDirUnavailable)?;
    Ok(home.join(CONFIG_DEFAULT_DIR).join(CONFIG_DEFAULT_FILE_NAME))
}

/// Config file location for the current user.
pub fn config_file_path(env: &EnvSnapshot) -> Result<PathBuf, ConfigError> {
    resolve_config_path(env, dirs::home_dir())
}

/// Directory holding the config file.
pub fn config_directory(env: &EnvSnapshot) -> Result<PathBuf, ConfigError> {
    let path = config_file_path(env)?;
    Ok(path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default())
}

/// Read the JSON config file; `None` if it does not exist.
pub fn read_config_file(path: &Path) -> Result<Option<Map<String, Value>>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let map = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(map))
}

/// Resolve the backplane API URL.
///
/// `BACKPLANE_URL` wins outright. Otherwise the active OCM environment must
/// register a backplane endpoint; the deprecated `url` file key is only used
/// when that lookup fails.
pub fn resolve_base_url<R: EnvironmentRegistry>(
    settings: &Settings,
    env: &EnvSnapshot,
    registry: &R,
) -> Result<String, ConfigError> {
    if let Some(url) = env.get(BACKPLANE_URL_ENV) {
        tracing::warn!(
            "Manual URL configuration is deprecated, please unset the environment {}",
            BACKPLANE_URL_ENV
        );
        return Ok(url.to_string());
    }

    match registry_backplane_url(registry) {
        Ok(url) => {
            tracing::info!(url = %url, "Backplane URL retrieved via OCM environment");
            Ok(url)
        }
        Err(e) => {
            let legacy = settings.get_string(URL_KEY);
            if legacy.is_empty() {
                return Err(e);
            }
            tracing::warn!(
                error = %e,
                url = %legacy,
                "Using deprecated url key from config file as last resort"
            );
            Ok(legacy)
        }
    }
}

fn registry_backplane_url<R: EnvironmentRegistry>(registry: &R) -> Result<String, ConfigError> {
    let environment = registry.active_environment()?;
    environment
        .endpoint_url(EndpointKind::Backplane)
        .map(str::to_string)
        .ok_or_else(|| ConfigError::EndpointUnavailable {
            environment: environment.name().to_string(),
        })
}

/// Build the effective configuration for this invocation.
pub async fn load_configuration<R, P>(
    env: &EnvSnapshot,
    registry: &R,
    probe: P,
    options: &LoadOptions,
) -> Result<BackplaneConfiguration, ConfigError>
where
    R: EnvironmentRegistry,
    P: ProxyProbe,
{
    let work = resolve(env, registry, probe, options);

    match options.deadline {
        Some(deadline) => time::timeout(deadline, work)
            .await
            .map_err(|_| ConfigError::DeadlineExceeded(deadline))?,
        None => work.await,
    }
}

async fn resolve<R, P>(
    env: &EnvSnapshot,
    registry: &R,
    probe: P,
    options: &LoadOptions,
) -> Result<BackplaneConfiguration, ConfigError>
where
    R: EnvironmentRegistry,
    P: ProxyProbe,
{
    let path = config_file_path(env)?;
    let file = read_config_file(&path)?;
    if file.is_none() {
        tracing::debug!(
            path = %path.display(),
            "No config file found, using defaults and environment"
        );
    }

    let settings = Settings::merge(Settings::defaults(), file, env);

    let report = validate_config(&settings, options.validation)?;
    report.log();

    let url = resolve_base_url(&settings, env, registry)?;

    let candidates = settings.get_string_slice(PROXY_URL_KEY);
    let proxy_url = ProxySelector::new(probe)
        .with_strategy(options.probe_strategy)
        .select(&candidates, &url)
        .await;

    let pagerduty_api_key = Some(settings.get_string(PAGERDUTY_KEY)).filter(|k| !k.is_empty());

    // A malformed table was already reported by validation.
    let jira_config = settings.jira_config().unwrap_or_default();

    let config = BackplaneConfiguration {
        url,
        proxy_url,
        session_directory: settings.get_string(SESSION_DIR_KEY),
        assume_initial_arn: settings.get_string(ASSUME_INITIAL_ARN_KEY),
        prod_env_name: settings.get_string(PROD_ENV_NAME_KEY),
        pagerduty_api_key,
        jira_base_url: settings.get_string(JIRA_BASE_URL_KEY),
        jira_token: settings.get_string(JIRA_TOKEN_KEY),
        jira_config,
    };

    tracing::debug!(
        url = %config.url(),
        proxy = ?config.proxy_url(),
        "Configuration resolved"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Environment;
    use serde_json::json;
    use tracing_test::traced_test;

    /// Registry with a fixed answer; `None` means the environment is unknown.
    struct FixedRegistry(Option<Environment>);

    impl EnvironmentRegistry for FixedRegistry {
        fn active_environment(&self) -> Result<Environment, RegistryError> {
            self.0
                .clone()
                .ok_or_else(|| RegistryError::UnknownEnvironment("missing".to_string()))
        }
    }

    fn with_backplane(url: &str) -> FixedRegistry {
        FixedRegistry(Some(
            Environment::new("production").with_endpoint(EndpointKind::Backplane, url),
        ))
    }

    fn settings(file: Value) -> Settings {
        let file = match file {
            Value::Object(map) => Some(map),
            _ => None,
        };
        Settings::merge(Settings::defaults(), file, &EnvSnapshot::default())
    }

    #[test]
    fn test_config_path_from_env() {
        let env = EnvSnapshot::from_pairs([(BACKPLANE_CONFIG_PATH_ENV, "/etc/bp.json")]);
        let path = resolve_config_path(&env, None).unwrap();
        assert_eq!(path, PathBuf::from("/etc/bp.json"));
    }

    #[test]
    fn test_config_path_under_home() {
        let home = Some(PathBuf::from("/home/op"));
        let path = resolve_config_path(&EnvSnapshot::default(), home).unwrap();
        assert_eq!(path, PathBuf::from("/home/op/.config/backplane/config.json"));
    }

    #[test]
    fn test_config_path_without_home_fails() {
        let err = resolve_config_path(&EnvSnapshot::default(), None).unwrap_err();
        assert!(matches!(err, ConfigError::HomeDirUnavailable));
    }

    #[test]
    fn test_config_directory_is_parent_of_path() {
        let env = EnvSnapshot::from_pairs([(BACKPLANE_CONFIG_PATH_ENV, "/etc/backplane/bp.json")]);
        assert_eq!(config_directory(&env).unwrap(), PathBuf::from("/etc/backplane"));
    }

    #[test]
    #[traced_test]
    fn test_env_url_override_wins() {
        let env = EnvSnapshot::from_pairs([(BACKPLANE_URL_ENV, "https://example.test")]);
        let registry = with_backplane("https://registry.test");

        let url = resolve_base_url(&settings(json!({})), &env, &registry).unwrap();

        assert_eq!(url, "https://example.test");
        assert!(logs_contain("Manual URL configuration is deprecated"));
        assert!(logs_contain(BACKPLANE_URL_ENV));
    }

    #[test]
    fn test_registry_url_used() {
        let url = resolve_base_url(
            &settings(json!({ "url": "https://legacy.test" })),
            &EnvSnapshot::default(),
            &with_backplane("https://registry.test"),
        )
        .unwrap();
        assert_eq!(url, "https://registry.test");
    }

    #[test]
    fn test_missing_endpoint_fails() {
        let registry = FixedRegistry(Some(Environment::new("custom")));
        let err = resolve_base_url(&settings(json!({})), &EnvSnapshot::default(), &registry)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EndpointUnavailable { environment } if environment == "custom"
        ));
    }

    #[test]
    #[traced_test]
    fn test_legacy_url_is_last_resort() {
        let registry = FixedRegistry(None);
        let url = resolve_base_url(
            &settings(json!({ "url": "https://legacy.test" })),
            &EnvSnapshot::default(),
            &registry,
        )
        .unwrap();
        assert_eq!(url, "https://legacy.test");
        assert!(logs_contain("Using deprecated url key from config file as last resort"));
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_config_file(&dir.path().join("absent.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_read_non_object_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "[\"http://proxy:1\"]").unwrap();

        assert!(matches!(
            read_config_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
