//! Read-only access to the identity record written by the sign-in flow.
//!
//! The record is a JSON object shared across the web views, stored
//! URL-encoded in the `guardianUser` cookie and, as a fallback, under the same
//! key in local storage. This module never writes or deletes it.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::core::constants::{ANONYMOUS_INITIALS, IDENTITY_KEY};
use crate::core::storage::LocalStore;
use crate::core::view::IdentityDisplay;

/// Account ids arrive as numbers from the auth API but as strings from older
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Numeric(id) => write!(f, "{id}"),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl Identity {
    pub fn initials(&self) -> String {
        initials_for(&self.name)
    }

    pub fn display(&self) -> IdentityDisplay {
        IdentityDisplay {
            name: Some(self.name.clone()),
            initials: self.initials(),
        }
    }
}

/// First two grapheme clusters of `name`, upper-cased.
pub fn initials_for(name: &str) -> String {
    let head: String = name.trim().graphemes(true).take(2).collect();
    if head.is_empty() {
        ANONYMOUS_INITIALS.to_string()
    } else {
        head.to_uppercase()
    }
}

pub fn anonymous_display() -> IdentityDisplay {
    IdentityDisplay {
        name: None,
        initials: ANONYMOUS_INITIALS.to_string(),
    }
}

pub fn display_for(identity: Option<&Identity>) -> IdentityDisplay {
    identity.map(Identity::display).unwrap_or_else(anonymous_display)
}

/// Parses a serialized identity record. Anything unusable is anonymous.
pub fn parse_identity(raw: &str) -> Option<Identity> {
    match serde_json::from_str::<Identity>(raw) {
        Ok(identity) => Some(identity),
        Err(err) => {
            debug!("ignoring unreadable identity record: {err}");
            None
        }
    }
}

/// Finds `name` in a `Cookie`-style header (`a=1; b=2`) and URL-decodes it.
/// When the name repeats, the last occurrence wins.
pub fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(key, _)| *key == name)
        .last()
        .and_then(|(_, value)| match urlencoding::decode(value) {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(err) => {
                debug!("cookie {name} is not valid URL encoding: {err}");
                None
            }
        })
        .filter(|value| !value.is_empty())
}

/// Source of the raw cookie header shared with the web views.
pub trait CookieSource {
    fn cookie_header(&self) -> Option<String>;
}

impl<C: CookieSource + ?Sized> CookieSource for Box<C> {
    fn cookie_header(&self) -> Option<String> {
        (**self).cookie_header()
    }
}

/// Cookie header given verbatim (command line, tests).
#[derive(Debug, Clone, Default)]
pub struct StaticCookies(pub Option<String>);

impl CookieSource for StaticCookies {
    fn cookie_header(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Cookie header read from a file the sign-in flow exports.
#[derive(Debug, Clone)]
pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CookieSource for CookieFile {
    fn cookie_header(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Some(contents.trim().to_string()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("cannot read cookie file {}: {err}", self.path.display());
                None
            }
        }
    }
}

pub trait IdentityProvider {
    fn resolve(&self) -> Option<Identity>;
}

/// Resolves the shared identity: cookie first, local record second.
pub struct SharedIdentity<C, S> {
    cookies: C,
    store: S,
}

impl<C: CookieSource, S: LocalStore> SharedIdentity<C, S> {
    pub fn new(cookies: C, store: S) -> Self {
        Self { cookies, store }
    }

    fn from_cookie(&self) -> Option<String> {
        self.cookies
            .cookie_header()
            .and_then(|header| cookie_value(&header, IDENTITY_KEY))
    }

    fn from_store(&self) -> Option<String> {
        match self.store.get(IDENTITY_KEY) {
            Ok(value) => value.filter(|value| !value.is_empty()),
            Err(err) => {
                warn!("local identity record unavailable: {err}");
                None
            }
        }
    }
}

impl<C: CookieSource, S: LocalStore> IdentityProvider for SharedIdentity<C, S> {
    fn resolve(&self) -> Option<Identity> {
        // A present but unreadable cookie does not fall through to storage.
        let raw = self.from_cookie().or_else(|| self.from_store())?;
        parse_identity(&raw)
    }
}

/// Provider for sessions that never have a signed-in user.
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn resolve(&self) -> Option<Identity> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use tempfile::TempDir;

    const RECORD: &str = r#"{"id":7,"name":"Vikram Patel","email":"v@example.org","phone":"99","role":"Client","is_verified_Advocate":false}"#;

    fn encoded(raw: &str) -> String {
        urlencoding::encode(raw).into_owned()
    }

    #[test]
    fn cookie_wins_over_local_record() {
        let cookie = format!(
            "theme=dark; guardianUser={}",
            encoded(r#"{"id":1,"name":"Asha Rao","role":"Advocate"}"#)
        );
        let provider = SharedIdentity::new(
            StaticCookies(Some(cookie)),
            MemoryStore::new().with_entry(IDENTITY_KEY, RECORD),
        );

        let identity = provider.resolve().expect("identity from cookie");
        assert_eq!(identity.name, "Asha Rao");
        assert_eq!(identity.role, "Advocate");
        assert_eq!(identity.id, UserId::Numeric(1));
    }

    #[test]
    fn local_record_is_the_fallback() {
        let provider = SharedIdentity::new(
            StaticCookies(Some("other=1".into())),
            MemoryStore::new().with_entry(IDENTITY_KEY, RECORD),
        );

        let identity = provider.resolve().expect("identity from storage");
        assert_eq!(identity.name, "Vikram Patel");
        assert_eq!(identity.initials(), "VI");
        assert_eq!(identity.id.to_string(), "7");
    }

    #[test]
    fn absence_and_garbage_are_anonymous() {
        let empty = SharedIdentity::new(StaticCookies(None), MemoryStore::new());
        assert_eq!(empty.resolve(), None);

        let garbage = SharedIdentity::new(
            StaticCookies(Some("guardianUser=%7Bbroken".into())),
            MemoryStore::new(),
        );
        assert_eq!(garbage.resolve(), None);

        let nameless = SharedIdentity::new(
            StaticCookies(None),
            MemoryStore::new().with_entry(IDENTITY_KEY, r#"{"id":3}"#),
        );
        assert_eq!(nameless.resolve(), None);
    }

    #[test]
    fn string_ids_and_missing_role_are_accepted() {
        let identity = parse_identity(r#"{"id":"u-9","name":"Meera"}"#).expect("parses");
        assert_eq!(identity.id, UserId::Text("u-9".into()));
        assert_eq!(identity.role, "");
    }

    #[test]
    fn cookie_lookup_matches_exact_names_and_keeps_equals_signs() {
        let header = "guardianUserX=1; guardianUser=a%3Db==; guardianUser=last";
        assert_eq!(cookie_value(header, "guardianUser").as_deref(), Some("last"));

        let header = "guardianUser=a%3Db==";
        assert_eq!(cookie_value(header, "guardianUser").as_deref(), Some("a=b=="));

        assert_eq!(cookie_value("guardianUser=", "guardianUser"), None);
    }

    #[test]
    fn initials_use_graphemes() {
        assert_eq!(initials_for("vikram"), "VI");
        assert_eq!(initials_for("  ana  "), "AN");
        assert_eq!(initials_for("É"), "É");
        assert_eq!(initials_for(""), ANONYMOUS_INITIALS);
        assert_eq!(initials_for("अनु"), "अनु".graphemes(true).take(2).collect::<String>());
    }

    #[test]
    fn cookie_file_is_read_and_missing_file_is_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("cookies.txt");

        assert_eq!(CookieFile::new(path.clone()).cookie_header(), None);

        fs::write(&path, format!("guardianUser={}\n", encoded(RECORD))).unwrap();
        let provider = SharedIdentity::new(CookieFile::new(path), MemoryStore::new());
        assert_eq!(provider.resolve().map(|i| i.name), Some("Vikram Patel".into()));
    }

    #[test]
    fn anonymous_display_has_no_name() {
        let display = display_for(None);
        assert_eq!(display.name, None);
        assert_eq!(display.initials, ANONYMOUS_INITIALS);
    }
}
