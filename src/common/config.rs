use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ComponentName;
use crate::sys::catalog::AppEntry;
use crate::sys::task::{RunningTask, UserId};

pub const DEFAULT_CAPACITY: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("dock capacity must be at least 1")]
    ZeroCapacity,
    #[error("default pinned app {0} is also excluded from the dock")]
    PinnedExcluded(ComponentName),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dock: DockSettings,
    /// Installed apps and running tasks for the in-memory platform used by
    /// the `dock` driver. Ignored when the dock runs against a real platform.
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DockSettings {
    pub capacity: usize,
    /// Pinned in declared order on start; entries past `capacity` are dropped.
    pub default_pinned: Vec<ComponentName>,
    pub excluded_components: Vec<ComponentName>,
    pub excluded_packages: Vec<String>,
    /// Only running tasks of this user feed the dock.
    pub user_id: UserId,
    /// Fixes the order in which launcher apps are recommended for empty slots.
    pub shuffle_seed: Option<u64>,
}

impl Default for DockSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            default_pinned: Vec::new(),
            excluded_components: Vec::new(),
            excluded_packages: Vec::new(),
            user_id: 0,
            shuffle_seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSettings {
    pub apps: Vec<AppEntry>,
    pub tasks: Vec<RunningTask>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dock").join("dock.toml"))
    }

    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dock = &self.dock;
        if dock.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if let Some(pinned) = dock.default_pinned.iter().find(|c| {
            dock.excluded_components.contains(c)
                || dock.excluded_packages.iter().any(|p| c.is_in_package(p))
        }) {
            return Err(ConfigError::PinnedExcluded(pinned.clone()));
        }
        Ok(())
    }
}
