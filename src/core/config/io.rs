use crate::core::config::data::{path_display, Config};
use crate::core::storage::replace_file;
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Write { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Could not read {}: {source}", path_display(path))
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Could not parse {}: {source}", path_display(path))
            }
            ConfigError::Write { path, source } => {
                write!(f, "Could not write {}: {source}", path_display(path))
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } | ConfigError::Write { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl Config {
    /// Reads `path`; a missing file is an empty configuration.
    pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
            .and_then(|contents| replace_file(path, contents.as_bytes()))
            .map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn default_path() -> Result<PathBuf, Box<dyn StdError>> {
        let dirs = ProjectDirs::from("org", "guardian", "guardian")
            .ok_or("Failed to determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn load() -> Result<Config, Box<dyn StdError>> {
        Ok(Self::load_from_path(&Self::default_path()?)?)
    }

    pub fn save(&self) -> Result<(), Box<dyn StdError>> {
        Ok(self.save_to_path(&Self::default_path()?)?)
    }
}
