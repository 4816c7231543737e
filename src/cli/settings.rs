//! `guardian settings`: the settings panel without the chat view.

use std::error::Error;

use crate::core::client::ClientContext;
use crate::core::settings::{Settings, SettingsPanel, SettingsStore, Speed, Theme};
use crate::core::storage::LocalStore;
use crate::core::view::{NullView, ViewSink};

pub const SETTING_KEYS: &[&str] = &["theme", "speed", "api-key", "disclaimer"];

pub fn show_settings(ctx: &ClientContext) -> Result<(), Box<dyn Error>> {
    let store = SettingsStore::load(ctx.local_store()?);
    print!("{}", describe(store.current()));
    Ok(())
}

pub fn set_setting(ctx: &ClientContext, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let mut store = SettingsStore::load(ctx.local_store()?);
    let saved = update(&mut store, key, value)?;
    println!("✅ Set {key}");
    print!("{}", describe(&saved));
    Ok(())
}

/// Edits one field through the panel and saves the result.
pub fn update<S: LocalStore>(
    store: &mut SettingsStore<S>,
    key: &str,
    value: &str,
) -> Result<Settings, Box<dyn Error>> {
    let mut view = NullView;
    let mut panel = SettingsPanel::new();
    panel.open(store.current(), &mut view);
    apply_field(&mut panel, key, value, &mut view)?;
    Ok(panel.save(store, &mut view)?)
}

fn apply_field<V: ViewSink>(
    panel: &mut SettingsPanel,
    key: &str,
    value: &str,
    view: &mut V,
) -> Result<(), Box<dyn Error>> {
    match key {
        "theme" => {
            let theme = Theme::parse(value).ok_or("theme must be light or dark")?;
            panel.set_theme(theme, view);
        }
        "speed" => {
            let speed = Speed::parse(value).ok_or("speed must be Detailed or Fast")?;
            panel.set_speed(speed, view);
        }
        "api-key" => panel.set_api_key(value, view)?,
        "disclaimer" => {
            let show = match value.trim().to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                _ => return Err("disclaimer must be on or off".into()),
            };
            panel.set_show_disclaimer(show, view);
        }
        _ => {
            return Err(format!(
                "Unknown setting: {key}. Available settings: {}",
                SETTING_KEYS.join(", ")
            )
            .into())
        }
    }
    Ok(())
}

pub fn describe(settings: &Settings) -> String {
    let mut text = String::from("Current settings:\n");
    text.push_str(&format!("  theme: {}\n", settings.theme.as_str()));
    text.push_str(&format!("  speed: {}\n", settings.speed.as_str()));
    if settings.api_key_visible() {
        let state = if settings.api_key.is_empty() {
            "(empty)"
        } else {
            "(set)"
        };
        text.push_str(&format!("  api-key: {state}\n"));
    }
    text.push_str(&format!(
        "  disclaimer: {}\n",
        if settings.show_disclaimer { "on" } else { "off" }
    ));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::SETTINGS_KEY;
    use crate::core::storage::FileStore;
    use tempfile::TempDir;

    #[test]
    fn update_persists_one_field() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("store.json");
        let mut store = SettingsStore::load(FileStore::new(path.clone()));

        let saved = update(&mut store, "theme", "dark").expect("update failed");
        assert_eq!(saved.theme, Theme::Dark);

        let reloaded = SettingsStore::load(FileStore::new(path));
        assert_eq!(reloaded.current().theme, Theme::Dark);
        assert!(reloaded.current().show_disclaimer);
        assert!(reloaded
            .store()
            .get(SETTINGS_KEY)
            .expect("get failed")
            .is_some());
    }

    #[test]
    fn api_key_needs_fast_mode() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut store = SettingsStore::load(FileStore::new(temp_dir.path().join("s.json")));

        let err = update(&mut store, "api-key", "k").expect_err("refused in Detailed");
        assert!(err.to_string().contains("Fast mode"));

        update(&mut store, "speed", "fast").expect("speed");
        let saved = update(&mut store, "api-key", "k").expect("key");
        assert_eq!(saved.api_key, "k");

        // Switching back keeps the key stored but no longer sends it.
        let saved = update(&mut store, "speed", "detailed").expect("speed");
        assert_eq!(saved.api_key, "k");
        assert_eq!(saved.effective_api_key(), "");
    }

    #[test]
    fn unknown_keys_and_values_are_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut store = SettingsStore::load(FileStore::new(temp_dir.path().join("s.json")));
        assert!(update(&mut store, "font", "big").is_err());
        assert!(update(&mut store, "disclaimer", "maybe").is_err());
        assert!(update(&mut store, "theme", "blue").is_err());
    }

    #[test]
    fn describe_hides_api_key_in_detailed_mode() {
        let settings = Settings {
            api_key: "left-over".into(),
            ..Default::default()
        };
        let text = describe(&settings);
        assert!(!text.contains("api-key"));
        assert!(text.contains("speed: Detailed"));
    }
}
