//! Built-in table of the well-known OCM environments.

use super::{EndpointKind, Environment, EnvironmentRegistry, RegistryError};

struct KnownEnvironment {
    name: &'static str,
    aliases: &'static [&'static str],
    api_url: &'static str,
    backplane_url: &'static str,
}

const KNOWN_ENVIRONMENTS: &[KnownEnvironment] = &[
    KnownEnvironment {
        name: "production",
        aliases: &["prod", "production"],
        api_url: "https://api.openshift.com",
        backplane_url: "https://api.backplane.openshift.com",
    },
    KnownEnvironment {
        name: "stage",
        aliases: &["stage", "staging"],
        api_url: "https://api.stage.openshift.com",
        backplane_url: "https://api.stage.backplane.openshift.com",
    },
    KnownEnvironment {
        name: "integration",
        aliases: &["int", "integration"],
        api_url: "https://api.integration.openshift.com",
        backplane_url: "https://api.integration.backplane.openshift.com",
    },
];

/// Registry over the fixed OCM environments, with one selected as active.
///
/// The selector may be an environment name, one of its aliases, or its API
/// URL. An API URL that matches no known environment yields an environment
/// with only the API endpoint registered.
#[derive(Debug, Clone)]
pub struct BuiltinRegistry {
    selector: String,
}

impl BuiltinRegistry {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl EnvironmentRegistry for BuiltinRegistry {
    fn active_environment(&self) -> Result<Environment, RegistryError> {
        let wanted = self.selector.trim().trim_end_matches('/');

        let known = KNOWN_ENVIRONMENTS.iter().find(|env| {
            env.aliases.iter().any(|a| a.eq_ignore_ascii_case(wanted)) || env.api_url == wanted
        });

        match known {
            Some(env) => Ok(Environment::new(env.name)
                .with_endpoint(EndpointKind::Api, env.api_url)
                .with_endpoint(EndpointKind::Backplane, env.backplane_url)),
            None if wanted.starts_with("http://") || wanted.starts_with("https://") => {
                Ok(Environment::new(wanted).with_endpoint(EndpointKind::Api, wanted))
            }
            None => Err(RegistryError::UnknownEnvironment(wanted.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_resolves() {
        let env = BuiltinRegistry::new("prod").active_environment().unwrap();
        assert_eq!(env.name(), "production");
        assert_eq!(
            env.endpoint_url(EndpointKind::Backplane),
            Some("https://api.backplane.openshift.com")
        );
    }

    #[test]
    fn test_api_url_resolves() {
        let env = BuiltinRegistry::new("https://api.stage.openshift.com/")
            .active_environment()
            .unwrap();
        assert_eq!(env.name(), "stage");
    }

    #[test]
    fn test_custom_url_has_no_backplane_endpoint() {
        let env = BuiltinRegistry::new("https://api.custom.test")
            .active_environment()
            .unwrap();
        assert_eq!(env.endpoint_url(EndpointKind::Backplane), None);
        assert_eq!(
            env.endpoint_url(EndpointKind::Api),
            Some("https://api.custom.test")
        );
    }

    #[test]
    fn test_unknown_name_errors() {
        let err = BuiltinRegistry::new("moon").active_environment().unwrap_err();
        assert!(matches!(err, RegistryError::UnknownEnvironment(name) if name == "moon"));
    }
}
