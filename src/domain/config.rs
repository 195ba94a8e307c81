use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{OutputLevel, PriorityFilter};

/// Settings for the documentation views.
///
/// Persisted as TOML. The on-disk layout is versioned so the domain type can
/// change without breaking existing files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct Config {
    /// Path to a catalog file replacing the built-in test catalog.
    ///
    /// Relative paths are resolved against the directory holding the
    /// configuration file.
    pub catalog: Option<PathBuf>,

    /// The output level shown when the switch diagram is first opened.
    initial_level: OutputLevel,

    /// Categories shown collapsed when the matrix is first opened.
    ///
    /// All other categories start expanded.
    pub collapsed: Vec<String>,

    /// The priority filter applied when the matrix is first opened.
    priority_filter: PriorityFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            initial_level: OutputLevel::Zero,
            collapsed: Vec::new(),
            priority_filter: PriorityFilter::All,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The output level shown initially.
    #[must_use]
    pub const fn initial_level(&self) -> OutputLevel {
        self.initial_level
    }

    /// Sets the output level shown initially.
    pub const fn set_initial_level(&mut self, level: OutputLevel) {
        self.initial_level = level;
    }

    /// The priority filter applied initially.
    #[must_use]
    pub const fn priority_filter(&self) -> PriorityFilter {
        self.priority_filter
    }

    /// Sets the priority filter applied initially.
    pub const fn set_priority_filter(&mut self, filter: PriorityFilter) {
        self.priority_filter = filter;
    }
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        catalog: Option<PathBuf>,

        /// `P`, `O` or `N` (or the full level name).
        #[serde(default = "default_level")]
        initial_level: String,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        collapsed: Vec<String>,

        /// `all` or a priority name.
        #[serde(default = "default_priority_filter")]
        priority_filter: String,
    },
}

fn default_level() -> String {
    OutputLevel::Zero.symbol().to_string()
}

fn default_priority_filter() -> String {
    PriorityFilter::All.to_string()
}

impl TryFrom<Versions> for Config {
    type Error = String;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 {
                catalog,
                initial_level,
                collapsed,
                priority_filter,
            } => Ok(Self {
                catalog,
                initial_level: initial_level.parse().map_err(|e| format!("{e}"))?,
                collapsed,
                priority_filter: priority_filter.parse().map_err(|e| format!("{e}"))?,
            }),
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            catalog: config.catalog,
            initial_level: config.initial_level.symbol().to_string(),
            collapsed: config.collapsed,
            priority_filter: config.priority_filter.to_string(),
        }
    }
}
