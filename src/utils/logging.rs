//! Diagnostic logging setup.
//!
//! Transport failures and storage fallbacks are reported through `tracing`
//! and never shown in the conversation. The interactive chat therefore logs
//! to a file or nowhere; one-shot commands may log to stderr.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives, e.g. `guardian=debug`.
pub const LOG_ENV: &str = "GUARDIAN_LOG";
const DEFAULT_DIRECTIVES: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Discard,
}

impl<'a> LogTarget<'a> {
    /// Picks the destination for a command. A log file always wins; without
    /// one, only non-interactive commands may write to stderr.
    pub fn choose(log_file: Option<&'a Path>, interactive: bool) -> Self {
        match log_file {
            Some(path) => LogTarget::File(path),
            None if interactive => LogTarget::Discard,
            None => LogTarget::Stderr,
        }
    }
}

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

pub fn init(target: LogTarget<'_>) -> Result<(), Box<dyn Error + Send + Sync>> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
    match target {
        LogTarget::File(path) => {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()?;
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init()?,
        LogTarget::Discard => builder.with_writer(std::io::sink).try_init()?,
    }
    Ok(())
}
