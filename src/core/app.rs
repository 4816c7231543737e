//! Everything one mounted chat view owns: the session, the settings panel and
//! the persisted settings behind it.

use crate::core::history::HistoryController;
use crate::core::identity::IdentityProvider;
use crate::core::session::ChatSession;
use crate::core::settings::{Settings, SettingsPanel, SettingsStore};
use crate::core::storage::{LocalStore, StorageError};
use crate::core::view::ViewSink;

pub struct App<V: ViewSink, S: LocalStore> {
    session: ChatSession<V>,
    panel: SettingsPanel,
    settings: SettingsStore<S>,
}

impl<V: ViewSink, S: LocalStore> App<V, S> {
    /// Loads settings into the view, then mounts a session on top of them.
    pub fn mount(mut view: V, store: S, identity: &dyn IdentityProvider) -> Self {
        let settings = SettingsStore::load_into(store, &mut view);
        let session = ChatSession::mount(view, settings.current().clone(), identity);
        Self {
            session,
            panel: SettingsPanel::new(),
            settings,
        }
    }

    pub fn session(&self) -> &ChatSession<V> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ChatSession<V> {
        &mut self.session
    }

    pub fn history(&mut self) -> HistoryController<'_, V> {
        HistoryController::new(&mut self.session)
    }

    pub fn persisted_settings(&self) -> &Settings {
        self.settings.current()
    }

    pub fn panel(&self) -> &SettingsPanel {
        &self.panel
    }

    /// Opens the panel if needed and hands out the draft for editing.
    pub fn edit_settings(&mut self) -> (&mut SettingsPanel, &mut V) {
        if !self.panel.is_open() {
            self.panel
                .open(self.settings.current(), self.session.view_mut());
        }
        (&mut self.panel, self.session.view_mut())
    }

    /// Persists the draft; the session picks it up for later requests.
    pub fn save_settings(&mut self) -> Result<(), StorageError> {
        let saved = self
            .panel
            .save(&mut self.settings, self.session.view_mut())?;
        self.session.use_settings(saved);
        Ok(())
    }

    pub fn cancel_settings(&mut self) {
        self.panel
            .cancel(self.settings.current(), self.session.view_mut());
    }

    pub fn into_parts(self) -> (V, S) {
        (self.session.into_view(), self.settings.into_store())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{SETTINGS_KEY, WELCOME_MESSAGE};
    use crate::core::identity::Anonymous;
    use crate::core::settings::{Speed, Theme};
    use crate::core::storage::MemoryStore;
    use crate::utils::test_utils::{RecordingView, ViewEvent};

    #[test]
    fn mount_reflects_stored_settings_and_seeds_welcome() {
        let store = MemoryStore::new().with_entry(
            SETTINGS_KEY,
            r#"{"theme":"dark","speed":"Fast","apiKey":"k","showDisclaimer":false}"#,
        );
        let app = App::mount(RecordingView::default(), store, &Anonymous);

        assert_eq!(app.session().settings().theme, Theme::Dark);
        let view = app.session().view();
        assert!(view.events.contains(&ViewEvent::Theme(Theme::Dark)));
        assert_eq!(view.texts(), vec![WELCOME_MESSAGE]);
        assert_eq!(view.last_panel().map(|panel| panel.open), Some(false));
    }

    #[test]
    fn saved_draft_reaches_storage_and_next_request() {
        let mut app = App::mount(RecordingView::default(), MemoryStore::new(), &Anonymous);
        {
            let (panel, view) = app.edit_settings();
            panel.set_speed(Speed::Fast, view);
            panel
                .set_api_key("fast-key", view)
                .expect("key is editable in Fast mode");
        }
        app.save_settings().expect("save failed");

        assert!(!app.panel().is_open());
        assert_eq!(app.persisted_settings().speed, Speed::Fast);
        assert_eq!(app.session().settings().api_key, "fast-key");

        let (_, store) = app.into_parts();
        let raw = store.get(SETTINGS_KEY).expect("get failed").expect("record");
        assert!(raw.contains("\"apiKey\":\"fast-key\""));
    }

    #[test]
    fn cancel_discards_the_draft() {
        let mut app = App::mount(RecordingView::default(), MemoryStore::new(), &Anonymous);
        {
            let (panel, view) = app.edit_settings();
            panel.set_theme(Theme::Dark, view);
        }
        app.cancel_settings();

        assert_eq!(app.persisted_settings().theme, Theme::Light);
        assert_eq!(app.panel().draft().theme, Theme::Light);
        assert_eq!(app.session().settings().theme, Theme::Light);
    }
}
