//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/docsync/config.toml)
//! 3. Environment variables (DOCSYNC_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "DOCSYNC";

/// Server used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://192.168.1.100:3000";

/// Request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Document server base URL
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Explicit user name (sanitized before use)
    #[serde(default)]
    pub username: Option<String>,

    /// Device name used when no user name is set
    #[serde(default)]
    pub device_name: Option<String>,

    /// Directory for saved documents
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    /// Directory for preview downloads
    #[serde(default = "default_preview_dir")]
    pub preview_dir: PathBuf,

    /// Log file (stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            timeout_secs: default_timeout_secs(),
            username: None,
            device_name: None,
            documents_dir: default_documents_dir(),
            preview_dir: default_preview_dir(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (DOCSYNC_SERVER_URL, DOCSYNC_USERNAME, ...)
    /// 2. Config file (~/.config/docsync/config.toml or DOCSYNC_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        config.validate().context("Invalid config TOML")?;
        Ok(config)
    }

    /// Reject values no client can work with
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(val) = env_var("SERVER_URL") {
            self.server_url = val;
        }

        if let Some(val) = env_var("TIMEOUT_SECS") {
            let secs: u64 = val
                .parse()
                .with_context(|| format!("Invalid {}_TIMEOUT_SECS: {:?}", ENV_PREFIX, val))?;
            if secs == 0 {
                bail!("Invalid {}_TIMEOUT_SECS: must be at least 1", ENV_PREFIX);
            }
            self.timeout_secs = secs;
        }

        if let Some(val) = env_var("USERNAME") {
            self.username = non_empty(val);
        }

        if let Some(val) = env_var("DEVICE_NAME") {
            self.device_name = non_empty(val);
        }

        if let Some(val) = env_var("DOCUMENTS_DIR") {
            self.documents_dir = PathBuf::from(val);
        }

        if let Some(val) = env_var("PREVIEW_DIR") {
            self.preview_dir = PathBuf::from(val);
        }

        Ok(())
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Device name to resolve the identity from
    ///
    /// Uses the configured name, then the host name reported by the
    /// environment.
    pub fn effective_device_name(&self) -> Option<String> {
        self.device_name
            .clone()
            .or_else(|| std::env::var("HOSTNAME").ok().and_then(non_empty))
            .or_else(|| std::env::var("COMPUTERNAME").ok().and_then(non_empty))
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with DOCSYNC_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Some(path) = env_var("CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docsync")
            .join("config.toml")
    }
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, suffix)).ok()
}

fn non_empty(val: String) -> Option<String> {
    if val.trim().is_empty() {
        None
    } else {
        Some(val)
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Get the default directory for saved documents
fn default_documents_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default directory for previews
fn default_preview_dir() -> PathBuf {
    std::env::temp_dir().join("docsync")
}
