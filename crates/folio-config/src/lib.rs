//! Configuration management for Folio.
//!
//! Parses `folio.toml` files with serde and provides auto-discovery of the
//! config file in the current directory and its parents. One file describes
//! any number of sites:
//!
//! ```toml
//! [[site]]
//! name = "example.org"
//! title = "Example"
//! host = "127.0.0.1"
//! port = 8080
//! path = "/srv/$name$"
//! cache = true
//! max_age = 3600
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Path Expansion
//!
//! `path` supports `$name$` (the site name), `${VAR}`, `${VAR:-default}` and
//! a leading `~`. Relative paths are resolved against the config file's
//! directory. `host` supports `${VAR}` and `${VAR:-default}`.

mod expand;
mod nginx;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use expand::NAME_PLACEHOLDER;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the host of every site.
    pub host: Option<String>,
    /// Override the port. Only valid when the config has a single site.
    pub port: Option<u16>,
    /// Override the cache flag of every site.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Sites, from `[[site]]` tables.
    #[serde(default, rename = "site")]
    pub sites: Vec<SiteConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// One served site.
#[derive(Clone, Debug, Deserialize)]
pub struct SiteConfig {
    /// Server name, used for nginx `server_name` and `$name$` expansion.
    pub name: String,
    /// Display name substituted into the page template. Defaults to `name`.
    #[serde(default)]
    pub title: Option<String>,
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Content root as written in the file.
    #[serde(rename = "path")]
    path_raw: String,
    /// Whether fingerprints are persisted to skip rendering fresh documents.
    #[serde(default = "default_cache")]
    pub cache: bool,
    /// `Cache-Control` max-age in seconds.
    #[serde(default = "default_max_age")]
    pub max_age: u32,

    /// Resolved content root (set after loading).
    #[serde(skip)]
    pub root: PathBuf,
}

impl SiteConfig {
    /// Create a site with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>, port: u16, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            name: name.into(),
            title: None,
            host: default_host(),
            port,
            path_raw: root.to_string_lossy().into_owned(),
            cache: default_cache(),
            max_age: default_max_age(),
            root,
        }
    }

    /// Display name: `title` if set, otherwise `name`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Socket address string (`host:port`).
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Expand variables in `host` and `path` and resolve the content root.
    fn resolve(&mut self, index: usize, config_dir: &Path) -> Result<(), ConfigError> {
        self.host = expand::expand_env(&self.host, &format!("site[{index}].host"))?;
        let path = expand::expand_path(&self.path_raw, &self.name, &format!("site[{index}].path"))?;
        self.root = if path.is_absolute() {
            path
        } else {
            config_dir.join(path)
        };
        Ok(())
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        require_non_empty(&self.name, &format!("site[{index}].name"))?;
        require_non_empty(&self.host, &format!("site[{index}].host"))?;
        require_non_empty(&self.path_raw, &format!("site[{index}].path"))?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.port == 0 {
            return Err(ConfigError::Validation(format!(
                "site[{index}].port cannot be 0"
            )));
        }

        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_cache() -> bool {
    true
}

fn default_max_age() -> u32 {
    3600
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site[0].path`").
        field: String,
        /// Error message (e.g., "${`SITES_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated last.
    ///
    /// # Errors
    ///
    /// Returns error if no config file is found, parsing fails, or validation
    /// fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => Self::discover_config().ok_or_else(|| {
                ConfigError::NotFound(PathBuf::from(CONFIG_FILENAME))
            })?,
        };

        let content = std::fs::read_to_string(&path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path);

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration text and resolve every site's content root.
    ///
    /// Relative paths are resolved against `config_dir`. Does not validate.
    pub fn from_toml_str(content: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        for (index, site) in config.sites.iter_mut().enumerate() {
            site.resolve(index, config_dir)?;
        }
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(port) = settings.port {
            let [site] = self.sites.as_mut_slice() else {
                return Err(ConfigError::Validation(
                    "--port requires a configuration with exactly one site".to_owned(),
                ));
            };
            site.port = port;
        }
        for site in &mut self.sites {
            if let Some(host) = &settings.host {
                site.host.clone_from(host);
            }
            if let Some(cache_enabled) = settings.cache_enabled {
                site.cache = cache_enabled;
            }
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Requires at least one site, non-empty names, hosts and paths,
    /// non-zero ports, and a distinct port per host.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sites.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[site]] is required".to_owned(),
            ));
        }

        let mut bound = HashSet::new();
        for (index, site) in self.sites.iter().enumerate() {
            site.validate(index)?;
            if !bound.insert((site.host.as_str(), site.port)) {
                return Err(ConfigError::Validation(format!(
                    "site[{index}] ({}) reuses address {}",
                    site.name,
                    site.address()
                )));
            }
        }

        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }
}
