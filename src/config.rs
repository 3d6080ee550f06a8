//! Store configuration loaded from TOML
//!
//! ```toml
//! [store]
//! builtin = true
//! directories = ["templates"]
//! extensions = ["go", "py"]
//!
//! [render]
//! policy = "strict"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::template::ValuePolicy;

/// Errors that can occur when loading or parsing a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Which templates a store loads and how it renders them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Include the templates compiled into the crate
    pub builtin: bool,
    /// Directories scanned recursively for template files
    pub directories: Vec<PathBuf>,
    /// File extensions to load; empty means every file
    pub extensions: Vec<String>,
    /// Handling of values that name no declared placeholder
    pub policy: ValuePolicy,
}

/// TOML structure for deserializing configurations
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    store: Option<TomlStore>,
    render: Option<TomlRender>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlStore {
    builtin: Option<bool>,
    directories: Option<Vec<PathBuf>>,
    extensions: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlRender {
    policy: Option<ValuePolicy>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            directories: Vec::new(),
            extensions: Vec::new(),
            policy: ValuePolicy::Strict,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    ///
    /// Relative directories are resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.directories = config
                .directories
                .into_iter()
                .map(|dir| if dir.is_relative() { base.join(dir) } else { dir })
                .collect();
        }
        Ok(config)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let store = parsed.store;
        Ok(StoreConfig {
            builtin: store
                .as_ref()
                .and_then(|s| s.builtin)
                .unwrap_or(defaults.builtin),
            directories: store
                .as_ref()
                .and_then(|s| s.directories.clone())
                .unwrap_or_default(),
            extensions: store
                .as_ref()
                .and_then(|s| s.extensions.clone())
                .unwrap_or_default(),
            policy: parsed
                .render
                .and_then(|r| r.policy)
                .unwrap_or(defaults.policy),
        })
    }

    /// Include or skip the built-in templates
    pub fn with_builtin(mut self, builtin: bool) -> Self {
        self.builtin = builtin;
        self
    }

    /// Add a template directory
    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Restrict directory loading to these extensions
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the extra-value policy
    pub fn with_policy(mut self, policy: ValuePolicy) -> Self {
        self.policy = policy;
        self
    }
}
