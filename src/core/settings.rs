//! Persisted chat preferences and the panel that edits them.
//!
//! The persisted copy lives in local storage under [`SETTINGS_KEY`] as a JSON
//! object shared with the web views. Loading never fails: a missing or
//! unreadable record yields [`Settings::default`].

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use tracing::{debug, warn};

use crate::core::constants::SETTINGS_KEY;
use crate::core::storage::{LocalStore, StorageError};
use crate::core::view::{PanelState, ViewSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Response style requested from the chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Speed {
    #[default]
    Detailed,
    Fast,
}

impl Speed {
    pub fn as_str(self) -> &'static str {
        match self {
            Speed::Detailed => "Detailed",
            Speed::Fast => "Fast",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "detailed" => Some(Speed::Detailed),
            "fast" => Some(Speed::Fast),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub speed: Speed,
    /// Only meaningful while `speed` is [`Speed::Fast`]; kept otherwise.
    pub api_key: String,
    pub show_disclaimer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            speed: Speed::Detailed,
            api_key: String::new(),
            show_disclaimer: true,
        }
    }
}

impl Settings {
    pub fn api_key_visible(&self) -> bool {
        self.speed == Speed::Fast
    }

    /// The key to transmit: the stored key in Fast mode, empty otherwise.
    pub fn effective_api_key(&self) -> &str {
        if self.api_key_visible() {
            &self.api_key
        } else {
            ""
        }
    }
}

/// Owns the persisted settings record and its last known value.
pub struct SettingsStore<S: LocalStore> {
    store: S,
    persisted: Settings,
}

impl<S: LocalStore> SettingsStore<S> {
    /// Reads the persisted record, substituting defaults when it is absent
    /// or malformed.
    pub fn load(store: S) -> Self {
        let persisted = read_settings(&store);
        Self { store, persisted }
    }

    /// Like [`SettingsStore::load`], and reflects the result in the panel.
    pub fn load_into<V: ViewSink + ?Sized>(store: S, view: &mut V) -> Self {
        let loaded = Self::load(store);
        view.reflect_settings(
            &loaded.persisted,
            PanelState {
                open: false,
                api_key_visible: loaded.persisted.api_key_visible(),
            },
        );
        loaded
    }

    pub fn current(&self) -> &Settings {
        &self.persisted
    }

    /// Persists the full record, then applies it. On a write failure the
    /// previously persisted value stays current.
    pub fn save<V: ViewSink + ?Sized>(
        &mut self,
        settings: Settings,
        view: &mut V,
    ) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(&settings).map_err(|err| StorageError::Write {
            path: SETTINGS_KEY.into(),
            source: err.into(),
        })?;
        self.store.set(SETTINGS_KEY, &serialized)?;
        debug!(theme = settings.theme.as_str(), speed = settings.speed.as_str(), "settings saved");
        self.persisted = settings;
        apply(&self.persisted, view);
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

fn read_settings<S: LocalStore + ?Sized>(store: &S) -> Settings {
    let raw = match store.get(SETTINGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Settings::default(),
        Err(err) => {
            warn!("settings unavailable, using defaults: {err}");
            return Settings::default();
        }
    };
    match serde_json::from_str::<Settings>(&raw) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("stored settings are malformed, using defaults: {err}");
            Settings::default()
        }
    }
}

/// Applies the visual effect of `settings` to the whole view.
pub fn apply<V: ViewSink + ?Sized>(settings: &Settings, view: &mut V) {
    view.apply_theme(settings.theme);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsPanelError {
    /// The API key field is hidden while speed is Detailed.
    ApiKeyHidden,
}

impl fmt::Display for SettingsPanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsPanelError::ApiKeyHidden => {
                write!(f, "The API key can only be edited in Fast mode")
            }
        }
    }
}

impl StdError for SettingsPanelError {}

/// Draft editing of settings. Nothing reaches storage until [`SettingsPanel::save`].
#[derive(Debug, Clone, Default)]
pub struct SettingsPanel {
    draft: Settings,
    open: bool,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &Settings {
        &self.draft
    }

    pub fn panel_state(&self) -> PanelState {
        PanelState {
            open: self.open,
            api_key_visible: self.draft.api_key_visible(),
        }
    }

    pub fn open<V: ViewSink + ?Sized>(&mut self, current: &Settings, view: &mut V) {
        if !self.open {
            self.draft = current.clone();
            self.open = true;
        }
        self.reflect(view);
    }

    pub fn set_theme<V: ViewSink + ?Sized>(&mut self, theme: Theme, view: &mut V) {
        self.draft.theme = theme;
        self.reflect(view);
    }

    /// Changes only the speed; the API key is kept whether or not it stays visible.
    pub fn set_speed<V: ViewSink + ?Sized>(&mut self, speed: Speed, view: &mut V) {
        self.draft.speed = speed;
        self.reflect(view);
    }

    pub fn set_api_key<V: ViewSink + ?Sized>(
        &mut self,
        api_key: &str,
        view: &mut V,
    ) -> Result<(), SettingsPanelError> {
        if !self.draft.api_key_visible() {
            return Err(SettingsPanelError::ApiKeyHidden);
        }
        self.draft.api_key = api_key.to_string();
        self.reflect(view);
        Ok(())
    }

    pub fn set_show_disclaimer<V: ViewSink + ?Sized>(&mut self, show: bool, view: &mut V) {
        self.draft.show_disclaimer = show;
        self.reflect(view);
    }

    /// Persists the draft, applies it and closes the panel. Returns the saved
    /// snapshot. The panel stays open when the write fails.
    pub fn save<S: LocalStore, V: ViewSink + ?Sized>(
        &mut self,
        store: &mut SettingsStore<S>,
        view: &mut V,
    ) -> Result<Settings, StorageError> {
        store.save(self.draft.clone(), view)?;
        self.open = false;
        self.reflect(view);
        Ok(store.current().clone())
    }

    pub fn cancel<V: ViewSink + ?Sized>(&mut self, persisted: &Settings, view: &mut V) {
        self.draft = persisted.clone();
        self.open = false;
        self.reflect(view);
    }

    fn reflect<V: ViewSink + ?Sized>(&self, view: &mut V) {
        view.reflect_settings(&self.draft, self.panel_state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use crate::utils::test_utils::{RecordingView, ViewEvent};

    fn store_with(raw: &str) -> MemoryStore {
        MemoryStore::new().with_entry(SETTINGS_KEY, raw)
    }

    #[test]
    fn absent_record_loads_defaults() {
        let store = SettingsStore::load(MemoryStore::new());
        assert_eq!(
            store.current(),
            &Settings {
                theme: Theme::Light,
                speed: Speed::Detailed,
                api_key: String::new(),
                show_disclaimer: true,
            }
        );
    }

    #[test]
    fn malformed_json_loads_exact_defaults() {
        for raw in ["{not json", "[]", "\"light\"", r#"{"theme":"sepia"}"#, r#"{"showDisclaimer":"yes"}"#] {
            let store = SettingsStore::load(store_with(raw));
            assert_eq!(store.current(), &Settings::default(), "input: {raw}");
        }
    }

    #[test]
    fn stored_record_uses_shared_field_names() {
        let raw = r#"{"theme":"dark","speed":"Fast","apiKey":"k-123","showDisclaimer":false}"#;
        let store = SettingsStore::load(store_with(raw));
        let settings = store.current();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.speed, Speed::Fast);
        assert_eq!(settings.api_key, "k-123");
        assert!(!settings.show_disclaimer);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let store = SettingsStore::load(store_with(r#"{"theme":"dark"}"#));
        assert_eq!(store.current().theme, Theme::Dark);
        assert_eq!(store.current().speed, Speed::Detailed);
        assert!(store.current().show_disclaimer);
    }

    #[test]
    fn load_into_reflects_panel_closed() {
        let mut view = RecordingView::default();
        let raw = r#"{"speed":"Fast"}"#;
        SettingsStore::load_into(store_with(raw), &mut view);
        assert_eq!(
            view.last_panel(),
            Some(PanelState {
                open: false,
                api_key_visible: true
            })
        );
    }

    #[test]
    fn save_persists_applies_and_closes() {
        let mut view = RecordingView::default();
        let mut store = SettingsStore::load(MemoryStore::new());
        let mut panel = SettingsPanel::new();

        panel.open(store.current(), &mut view);
        panel.set_theme(Theme::Dark, &mut view);
        panel.set_show_disclaimer(false, &mut view);
        let saved = panel.save(&mut store, &mut view).expect("save failed");

        assert!(!panel.is_open());
        assert_eq!(saved.theme, Theme::Dark);
        assert!(view.events.contains(&ViewEvent::Theme(Theme::Dark)));

        let raw = store.store().get(SETTINGS_KEY).unwrap().expect("record written");
        let reread: Settings = serde_json::from_str(&raw).unwrap();
        assert_eq!(reread, saved);
        assert!(raw.contains("\"showDisclaimer\":false"));
    }

    #[test]
    fn speed_toggle_changes_visibility_but_keeps_values() {
        let mut view = RecordingView::default();
        let mut panel = SettingsPanel::new();
        panel.open(&Settings::default(), &mut view);

        panel.set_speed(Speed::Fast, &mut view);
        assert!(panel.panel_state().api_key_visible);
        panel.set_api_key("secret", &mut view).expect("visible in Fast");

        panel.set_speed(Speed::Detailed, &mut view);
        assert!(!panel.panel_state().api_key_visible);
        assert_eq!(panel.draft().api_key, "secret");

        panel.set_speed(Speed::Fast, &mut view);
        assert_eq!(panel.draft().api_key, "secret");
    }

    #[test]
    fn api_key_edit_is_refused_in_detailed_mode() {
        let mut view = RecordingView::default();
        let mut panel = SettingsPanel::new();
        panel.open(&Settings::default(), &mut view);

        assert_eq!(
            panel.set_api_key("nope", &mut view),
            Err(SettingsPanelError::ApiKeyHidden)
        );
        assert_eq!(panel.draft().api_key, "");
    }

    #[test]
    fn cancel_discards_draft() {
        let mut view = RecordingView::default();
        let mut store = SettingsStore::load(MemoryStore::new());
        let mut panel = SettingsPanel::new();

        panel.open(store.current(), &mut view);
        panel.set_theme(Theme::Dark, &mut view);
        panel.cancel(store.current(), &mut view);

        assert_eq!(panel.draft().theme, Theme::Light);
        assert_eq!(store.current().theme, Theme::Light);

        panel.open(store.current(), &mut view);
        let saved = panel.save(&mut store, &mut view).unwrap();
        assert_eq!(saved.theme, Theme::Light);
    }

    #[test]
    fn effective_key_is_blank_outside_fast_mode() {
        let mut settings = Settings {
            api_key: "stale".into(),
            ..Default::default()
        };
        assert_eq!(settings.effective_api_key(), "");
        settings.speed = Speed::Fast;
        assert_eq!(settings.effective_api_key(), "stale");
    }
}
