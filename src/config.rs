//! Configuration management for the launcher
//!
//! Handles persistent settings including:
//! - Native core location and entry symbol
//! - Storage volume mount points for document URIs
//! - Log filter
//! - Recent files and last used directory

use crate::entry_point::DEFAULT_ENTRY_SYMBOL;
use crate::log_filter::CONFIG;
use crate::resolver::StorageVolumes;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum number of recent files to remember
pub const MAX_RECENT_FILES: usize = 20;

/// File name of the launcher configuration inside a config directory
pub const CONFIG_FILE_NAME: &str = "launcher.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where a configuration returned by [`LauncherConfig::open`] came from
#[derive(Debug)]
pub enum ConfigSource {
    Loaded,
    /// The file was missing and has been written with defaults
    Created,
    /// The file could not be read or created; defaults are in use
    Defaults(ConfigError),
}

impl ConfigSource {
    pub fn log(&self, path: &Path) {
        match self {
            ConfigSource::Loaded => {
                log::info!(target: CONFIG, "Loaded configuration from: {}", path.display())
            }
            ConfigSource::Created => log::warn!(
                target: CONFIG,
                "No configuration at {}, created it from defaults",
                path.display()
            ),
            ConfigSource::Defaults(e) => {
                log::error!(target: CONFIG, "Failed to load config file {}: {}", path.display(), e);
                log::info!(target: CONFIG, "Using default configuration");
            }
        }
    }
}

/// Launcher configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LauncherConfig {
    /// Path to the native core library exporting the entry point
    #[serde(default)]
    pub core_library: Option<PathBuf>,

    /// Exported symbol called with the selected path
    #[serde(default = "default_entry_symbol")]
    pub entry_symbol: String,

    /// Mount point of the primary shared storage volume
    #[serde(default = "default_primary_storage")]
    pub primary_storage: PathBuf,

    /// Directory removable volumes are mounted under
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// Log filter in `class:level` form, e.g. `*:Info Core:Debug`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Recently launched files, most recent first
    #[serde(default)]
    pub recent_files: Vec<PathBuf>,

    /// Directory the file chooser last opened in
    #[serde(default)]
    pub last_directory: Option<PathBuf>,
}

fn default_entry_symbol() -> String {
    DEFAULT_ENTRY_SYMBOL.to_string()
}

fn default_primary_storage() -> PathBuf {
    StorageVolumes::default().primary
}

fn default_storage_root() -> PathBuf {
    StorageVolumes::default().root
}

fn default_log_filter() -> String {
    "*:Info".to_string()
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            core_library: None,
            entry_symbol: default_entry_symbol(),
            primary_storage: default_primary_storage(),
            storage_root: default_storage_root(),
            log_filter: default_log_filter(),
            recent_files: Vec::new(),
            last_directory: None,
        }
    }
}

impl LauncherConfig {
    /// Get the configuration file path
    #[cfg(feature = "desktop")]
    pub fn config_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            let citra_dir = config_dir.join("citra");
            fs::create_dir_all(&citra_dir).ok();
            citra_dir.join(CONFIG_FILE_NAME)
        } else {
            PathBuf::from(CONFIG_FILE_NAME)
        }
    }

    /// Save configuration to the default location
    #[cfg(feature = "desktop")]
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Read configuration from `path`
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Read configuration from `path` without logging.
    ///
    /// A missing file is created from defaults. A broken file is left alone
    /// and defaults are used in memory. Callers that open the config before
    /// logging is up report the [`ConfigSource`] afterwards.
    pub fn open(path: &Path) -> (Self, ConfigSource) {
        if !path.exists() {
            let config = Self::default();
            let source = match config.write_to(path) {
                Ok(()) => ConfigSource::Created,
                Err(e) => ConfigSource::Defaults(e),
            };
            return (config, source);
        }

        match Self::load_from(path) {
            Ok(config) => (config, ConfigSource::Loaded),
            Err(e) => (Self::default(), ConfigSource::Defaults(e)),
        }
    }

    /// [`open`](Self::open) and log how it went
    pub fn load_or_default(path: &Path) -> Self {
        let (config, source) = Self::open(path);
        source.log(path);
        config
    }

    /// Write configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.write_to(path)?;
        log::info!(target: CONFIG, "Saved configuration to: {}", path.display());
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn storage_volumes(&self) -> StorageVolumes {
        StorageVolumes {
            primary: self.primary_storage.clone(),
            root: self.storage_root.clone(),
        }
    }

    /// Add to recent files (maintains max 20)
    pub fn add_recent(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        if let Some(parent) = path.parent() {
            self.last_directory = Some(parent.to_path_buf());
        }
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn recent_files_are_deduped_and_capped() {
        let mut config = LauncherConfig::default();
        for i in 0..25 {
            config.add_recent(PathBuf::from(format!("/games/{}.3ds", i)));
        }
        config.add_recent(PathBuf::from("/games/10.3ds"));

        assert_eq!(config.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(config.recent_files[0], PathBuf::from("/games/10.3ds"));
        assert_eq!(config.recent_files[1], PathBuf::from("/games/24.3ds"));
        assert_eq!(
            config
                .recent_files
                .iter()
                .filter(|p| p.ends_with("10.3ds"))
                .count(),
            1
        );
        assert_eq!(config.last_directory, Some(PathBuf::from("/games")));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: LauncherConfig =
            toml::from_str("core_library = \"/opt/citra/libcitra-core.so\"\n").unwrap();
        assert_eq!(
            config.core_library,
            Some(PathBuf::from("/opt/citra/libcitra-core.so"))
        );
        assert_eq!(config.entry_symbol, "Load");
        assert_eq!(config.primary_storage, PathBuf::from("/storage/emulated/0"));
        assert_eq!(config.log_filter, "*:Info");
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config").join(CONFIG_FILE_NAME);

        let mut config = LauncherConfig::default();
        config.entry_symbol = "citra_load".to_string();
        config.add_recent(PathBuf::from("/games/zelda.3ds"));
        config.save_to(&path).unwrap();

        assert_eq!(LauncherConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "recent_files = 7").unwrap();

        assert!(LauncherConfig::load_from(&path).is_err());
        assert_eq!(LauncherConfig::load_or_default(&path), LauncherConfig::default());

        // The user's file is not clobbered
        assert_eq!(fs::read_to_string(&path).unwrap(), "recent_files = 7");
    }

    #[test]
    fn missing_file_is_created_from_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config").join(CONFIG_FILE_NAME);

        let (config, source) = LauncherConfig::open(&path);
        assert!(matches!(source, ConfigSource::Created));
        assert_eq!(config, LauncherConfig::default());
        assert!(path.exists());

        let (reopened, source) = LauncherConfig::open(&path);
        assert!(matches!(source, ConfigSource::Loaded));
        assert_eq!(reopened, config);
    }
}
