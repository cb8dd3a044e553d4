use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vidscribe_core::naming::domain::naming_strategy::NamingStrategy;
use vidscribe_core::shared::constants::{DEFAULT_COPY_BUFFER_SIZE, DEFAULT_STORAGE_DIR};

pub const DEFAULT_JOBS: usize = 4;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no configuration directory on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub storage_dir: PathBuf,
    pub naming_strategy: NamingStrategy,
    pub transcribe: bool,
    /// Program and arguments; the stored file's path is appended.
    pub transcriber_command: Option<Vec<String>>,
    pub max_upload_bytes: Option<u64>,
    pub copy_buffer_size: usize,
    pub jobs: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            naming_strategy: NamingStrategy::default(),
            transcribe: true,
            transcriber_command: None,
            max_upload_bytes: None,
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            jobs: DEFAULT_JOBS,
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vidscribe").join("settings.json"))
    }

    /// Loads from the default location. A missing file yields defaults; a
    /// malformed one is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("{e}; using defaults");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |e| SettingsError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| SettingsError::Write {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        fs::write(path, json).map_err(write_err)
    }
}
