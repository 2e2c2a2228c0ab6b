//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/catreorder/catreorder.toml`
//! 3. Local config: `--config <file>` or `./.catreorder.toml`
//! 4. Environment variables: `CATREORDER_*` prefix, `__` for nesting

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const LOCAL_CONFIG_FILE: &str = ".catreorder.toml";
const ENV_PREFIX: &str = "CATREORDER";

/// Remote category API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Operator credentials. `token` wins over `token_file`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
}

/// Raw layer for intermediate parsing; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawApiConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub api: RawApiConfig,
    pub session: SessionConfig,
}

/// Unified configuration for catreorder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

/// Get the XDG config directory for catreorder.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "catreorder").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("catreorder.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand `~`, `$VAR` and `${VAR}` in `session.token_file`.
    fn expand_paths(&mut self) -> Result<(), ApplicationError> {
        let Some(path) = self.session.token_file.take() else {
            return Ok(());
        };
        let raw = path.to_string_lossy().into_owned();
        let expanded = shellexpand::full(&raw)
            .map_err(|e| ApplicationError::Config {
                message: format!("expand token_file {raw}: {e}"),
            })?
            .into_owned();
        self.session.token_file = Some(PathBuf::from(expanded));
        Ok(())
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            api: ApiConfig {
                base_url: overlay
                    .api
                    .base_url
                    .clone()
                    .unwrap_or_else(|| self.api.base_url.clone()),
                timeout_secs: overlay.api.timeout_secs.unwrap_or(self.api.timeout_secs),
            },
            session: SessionConfig {
                token: overlay
                    .session
                    .token
                    .clone()
                    .or_else(|| self.session.token.clone()),
                token_file: overlay
                    .session
                    .token_file
                    .clone()
                    .or_else(|| self.session.token_file.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit config file (`--config`). When `None`,
    ///   `./.catreorder.toml` is used if present.
    ///
    /// An explicit file must exist; the implicit ones are optional.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        match local {
            Some(path) => current = current.merge_with(&load_raw_settings(path)?),
            None => {
                let implicit = PathBuf::from(LOCAL_CONFIG_FILE);
                if implicit.exists() {
                    current = current.merge_with(&load_raw_settings(&implicit)?);
                }
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths()?;
        Ok(current)
    }

    /// Apply CATREORDER_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("api.base_url") {
            settings.api.base_url = val;
        }
        if let Ok(val) = config.get::<u64>("api.timeout_secs") {
            settings.api.timeout_secs = val;
        }
        if let Ok(val) = config.get_string("session.token") {
            settings.session.token = Some(val);
        }
        if let Ok(val) = config.get_string("session.token_file") {
            settings.session.token_file = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML, token redacted.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        let mut shown = self.clone();
        if shown.session.token.is_some() {
            shown.session.token = Some("<redacted>".into());
        }
        toml::to_string_pretty(&shown).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# catreorder configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/catreorder/catreorder.toml
#   Local:  ./.catreorder.toml or --config <file>
#   Env:    CATREORDER_* environment variables, e.g. CATREORDER_API__BASE_URL

[api]
# Base URL of the category API
# base_url = "http://localhost:8000/api"

# Request timeout in seconds
# timeout_secs = 30

[session]
# Bearer token sent as "Authorization: Bearer <token>"
# token = "..."

# Read the token from a file instead (~ and $VAR are expanded)
# token_file = "~/.config/catreorder/token"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
