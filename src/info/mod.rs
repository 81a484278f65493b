//! Static information about the CLI: environment variable names, default
//! locations and the build version.

/// Deprecated direct override of the backplane API URL.
pub const BACKPLANE_URL_ENV: &str = "BACKPLANE_URL";

/// Proxy override; bound to the `proxy-url` config key with highest precedence.
pub const BACKPLANE_PROXY_ENV: &str = "HTTPS_PROXY";

/// Explicit path to the configuration file.
pub const BACKPLANE_CONFIG_PATH_ENV: &str = "BACKPLANE_CONFIG";

/// Config directory relative to the user's home.
pub const CONFIG_DEFAULT_DIR: &str = ".config/backplane";

/// Config file name inside [`CONFIG_DEFAULT_DIR`].
pub const CONFIG_DEFAULT_FILE_NAME: &str = "config.json";

/// Session directory name under the home directory when `session-dir` is unset.
pub const DEFAULT_SESSION_DIRECTORY: &str = "backplane";

/// Liveness path appended to the backplane URL when qualifying a proxy.
pub const HEALTH_CHECK_PATH: &str = "/healthz";

/// Version reported by `ocm-backplane version`.
///
/// Release builds stamp `BACKPLANE_VERSION` at compile time; otherwise the
/// crate version is used.
pub fn build_version() -> &'static str {
    match option_env!("BACKPLANE_VERSION") {
        Some(v) if !v.is_empty() => v.trim_start_matches('v'),
        _ => env!("CARGO_PKG_VERSION"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_version_not_empty() {
        let version = build_version();
        assert!(!version.is_empty());
        assert!(!version.starts_with('v'));
    }
}
