//! Runtime wiring resolved from the config file and command-line overrides.

use std::error::Error;

use crate::api::HttpChatClient;
use crate::core::config::Config;
use crate::core::identity::{CookieFile, CookieSource, SharedIdentity, StaticCookies};
use crate::core::storage::FileStore;

/// Per-invocation values that take precedence over `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    /// Raw cookie header, as a browser would send it.
    pub cookie: Option<String>,
}

pub type ResolvedIdentity = SharedIdentity<Box<dyn CookieSource>, FileStore>;

#[derive(Debug, Clone)]
pub struct ClientContext {
    config: Config,
    overrides: Overrides,
}

impl ClientContext {
    pub fn new(config: Config, overrides: Overrides) -> Self {
        Self { config, overrides }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        self.overrides
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.config.effective_base_url())
    }

    pub fn transport(&self) -> HttpChatClient {
        HttpChatClient::new(self.base_url())
    }

    pub fn local_store(&self) -> Result<FileStore, Box<dyn Error>> {
        FileStore::in_dir(self.config.storage_dir.as_deref())
    }

    /// The command-line cookie wins over the configured cookie file.
    pub fn cookies(&self) -> Box<dyn CookieSource> {
        match (&self.overrides.cookie, &self.config.cookie_file) {
            (Some(header), _) => Box::new(StaticCookies(Some(header.clone()))),
            (None, Some(path)) => Box::new(CookieFile::new(path.clone())),
            (None, None) => Box::new(StaticCookies(None)),
        }
    }

    pub fn identity(&self) -> Result<ResolvedIdentity, Box<dyn Error>> {
        Ok(SharedIdentity::new(self.cookies(), self.local_store()?))
    }
}
