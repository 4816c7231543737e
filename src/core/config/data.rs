use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::constants::DEFAULT_BASE_URL;

/// Client configuration read from `config.toml`.
///
/// Everything here is about *where* the client talks to and keeps its files.
/// User-facing chat preferences live in [`crate::core::settings::Settings`]
/// instead, because the web views share those through local storage.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Root of the chat and history endpoints (e.g., "http://localhost:8000")
    pub base_url: Option<String>,
    /// File holding the raw cookie string written by the sign-in flow
    pub cookie_file: Option<PathBuf>,
    /// Directory for the local storage file; platform data dir when unset
    pub storage_dir: Option<PathBuf>,
    /// Diagnostic log destination for interactive sessions
    pub log_file: Option<PathBuf>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

/// Keys accepted by `guardian set` / `guardian unset`.
pub const CONFIG_KEYS: &[&str] = &["base-url", "cookie-file", "storage-dir", "log-file"];

impl Config {
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }
        match key {
            "base-url" => self.base_url = Some(value.to_string()),
            "cookie-file" => self.cookie_file = Some(PathBuf::from(value)),
            "storage-dir" => self.storage_dir = Some(PathBuf::from(value)),
            "log-file" => self.log_file = Some(PathBuf::from(value)),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "base-url" => self.base_url = None,
            "cookie-file" => self.cookie_file = None,
            "storage-dir" => self.storage_dir = None,
            "log-file" => self.log_file = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        println!("  base-url: {}", self.effective_base_url());
        print_path("cookie-file", self.cookie_file.as_deref());
        print_path("storage-dir", self.storage_dir.as_deref());
        print_path("log-file", self.log_file.as_deref());
    }
}

fn print_path(label: &str, path: Option<&Path>) {
    match path {
        Some(path) => println!("  {label}: {}", path_display(path)),
        None => println!("  {label}: (unset)"),
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {key}. Available keys: {}",
        CONFIG_KEYS.join(", ")
    )
}
