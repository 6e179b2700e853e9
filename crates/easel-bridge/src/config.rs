//! Bridge configuration with hierarchical loading.
//!
//! # Load order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.easel/config.toml`)
//! 3. Project config (`.easel/config.toml`)
//! 4. Environment variables (`EASEL_*`)
//!
//! Each layer overrides the previous. CLI arguments are applied by the
//! binary on top of the loaded config.

use crate::error::BridgeError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default WebSocket port the panel connects to.
pub const DEFAULT_WS_PORT: u16 = 8081;

/// Default per-call timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// Bridge settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// WebSocket port, loopback only. `0` binds an ephemeral port
    /// (tests).
    pub ws_port: u16,
    /// Optional HTTP side-channel port; must differ from `ws_port`.
    pub http_port: Option<u16>,
    /// Per-call timeout in seconds.
    pub timeout_secs: f64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            ws_port: DEFAULT_WS_PORT,
            http_port: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BridgeConfig {
    /// Per-call timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    /// Validates port ranges and distinctness.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] for privileged ports, a
    /// non-positive timeout, or an HTTP port colliding with the
    /// WebSocket port.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.ws_port != 0 && self.ws_port < 1024 {
            return Err(BridgeError::Config(format!(
                "ws_port must be in 1024-65535, got {}",
                self.ws_port
            )));
        }
        if let Some(http) = self.http_port {
            if http < 1024 {
                return Err(BridgeError::Config(format!(
                    "http_port must be in 1024-65535, got {http}"
                )));
            }
            if http == self.ws_port {
                return Err(BridgeError::Config(format!(
                    "http_port and ws_port must be distinct, both are {http}"
                )));
            }
        }
        if self.timeout_secs <= 0.0 {
            return Err(BridgeError::Config(format!(
                "timeout_secs must be positive, got {}",
                self.timeout_secs
            )));
        }
        Ok(())
    }
}

/// File layer: every field optional so layers merge cleanly.
#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    ws_port: Option<u16>,
    http_port: Option<u16>,
    timeout_secs: Option<f64>,
}

impl PartialConfig {
    fn merge_into(self, config: &mut BridgeConfig) {
        if let Some(port) = self.ws_port {
            config.ws_port = port;
        }
        if self.http_port.is_some() {
            config.http_port = self.http_port;
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
    }
}

/// Configuration loader with builder-style layer control.
///
/// # Example
///
/// ```no_run
/// use easel_bridge::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/path/to/project")
///     .load()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    global_config_path: Option<PathBuf>,
    project_root: Option<PathBuf>,
    skip_env: bool,
    skip_global: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root; project config is read from
    /// `<root>/.easel/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variables, for deterministic tests.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips the global config file.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Loads and merges all layers, then validates.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] when a config file exists but
    /// cannot be parsed, an env var is malformed, or validation fails.
    /// Missing files are silently skipped.
    pub fn load(&self) -> Result<BridgeConfig, BridgeError> {
        let mut config = BridgeConfig::default();

        if !self.skip_global {
            let global = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_global_config_path);
            if let Some(partial) = load_file(&global)? {
                debug!(path = %global.display(), "loaded global config");
                partial.merge_into(&mut config);
            }
        }

        if let Some(root) = &self.project_root {
            let project = root.join(".easel").join("config.toml");
            if let Some(partial) = load_file(&project)? {
                debug!(path = %project.display(), "loaded project config");
                partial.merge_into(&mut config);
            }
        }

        if !self.skip_env {
            apply_env(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn default_global_config_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".easel")
        .join("config.toml")
}

fn load_file(path: &Path) -> Result<Option<PartialConfig>, BridgeError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(BridgeError::Config(format!(
                "cannot read {}: {e}",
                path.display()
            )))
        }
    };
    toml::from_str(&text)
        .map(Some)
        .map_err(|e| BridgeError::Config(format!("cannot parse {}: {e}", path.display())))
}

fn apply_env(config: &mut BridgeConfig) -> Result<(), BridgeError> {
    if let Ok(value) = std::env::var("EASEL_WS_PORT") {
        config.ws_port = value
            .parse()
            .map_err(|_| BridgeError::Config(format!("EASEL_WS_PORT: expected port, got {value:?}")))?;
    }
    if let Ok(value) = std::env::var("EASEL_HTTP_PORT") {
        config.http_port = Some(value.parse().map_err(|_| {
            BridgeError::Config(format!("EASEL_HTTP_PORT: expected port, got {value:?}"))
        })?);
    }
    if let Ok(value) = std::env::var("EASEL_TIMEOUT") {
        config.timeout_secs = value.parse().map_err(|_| {
            BridgeError::Config(format!("EASEL_TIMEOUT: expected seconds, got {value:?}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader_for(dir: &Path) -> ConfigLoader {
        ConfigLoader::new()
            .skip_env_vars()
            .skip_global_config()
            .with_project_root(dir)
    }

    #[test]
    fn defaults_apply_with_no_layers() {
        let config = ConfigLoader::new()
            .skip_env_vars()
            .skip_global_config()
            .load()
            .unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.ws_port, 8081);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn project_config_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join(".easel");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("config.toml"), "ws_port = 9000\ntimeout_secs = 5.0\n")
            .unwrap();

        let config = loader_for(dir.path()).load().unwrap();
        assert_eq!(config.ws_port, 9000);
        assert_eq!(config.timeout_secs, 5.0);
        assert_eq!(config.http_port, None);
    }

    #[test]
    fn malformed_file_is_an_error_not_a_skip() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join(".easel");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("config.toml"), "ws_port = \"not a port\"").unwrap();

        let err = loader_for(dir.path()).load().unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn privileged_port_is_rejected() {
        let config = BridgeConfig {
            ws_port: 80,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn http_port_must_differ_from_ws_port() {
        let config = BridgeConfig {
            ws_port: 8081,
            http_port: Some(8081),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let ok = BridgeConfig {
            ws_port: 8081,
            http_port: Some(8080),
            ..Default::default()
        };
        ok.validate().unwrap();
    }

    #[test]
    fn non_positive_timeout_is_rejected() {
        let config = BridgeConfig {
            timeout_secs: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
