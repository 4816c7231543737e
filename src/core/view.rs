//! The capability the chat core requires of whatever displays it.
//!
//! The core never touches a terminal or a document directly. It describes
//! each visual change as a call on [`ViewSink`], which keeps the session logic
//! testable with a recording sink.

use crate::core::constants::DISCLAIMER;
use crate::core::message::Sender;
use crate::core::settings::{Settings, Theme};

/// Stable handle for a displayed entry, unique within one session.
pub type EntryId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Right-aligned entries written by the person using the view.
    OwnSide,
    /// Left-aligned entries written by the assistant.
    Counterpart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    Initials(String),
    Icon(&'static str),
}

/// A message prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub id: EntryId,
    pub sender: Sender,
    pub layout: Layout,
    pub avatar: Avatar,
    /// Message text split at embedded newlines.
    pub lines: Vec<String>,
    /// Display-only suffix; never part of the stored message text.
    pub disclaimer: Option<&'static str>,
    /// True only for the transient "Thinking..." entry.
    pub pending: bool,
}

impl RenderedEntry {
    /// Content lines followed by the disclaimer, separated by a blank line.
    pub fn display_text(&self) -> String {
        let mut text = self.lines.join("\n");
        if let Some(disclaimer) = self.disclaimer {
            text.push_str("\n\n");
            text.push_str(disclaimer);
        }
        text
    }

    pub fn has_disclaimer(&self) -> bool {
        self.disclaimer == Some(DISCLAIMER)
    }
}

/// How the settings panel should currently look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelState {
    pub open: bool,
    pub api_key_visible: bool,
}

/// Identity-derived text shown outside the conversation (profile badge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDisplay {
    pub name: Option<String>,
    pub initials: String,
}

pub trait ViewSink {
    fn append(&mut self, entry: &RenderedEntry);
    fn remove(&mut self, id: EntryId);
    fn clear(&mut self);
    fn scroll_to_latest(&mut self);

    /// Rewrite the avatar of every user entry already on screen.
    fn relabel_user_avatars(&mut self, initials: &str);
    fn show_identity(&mut self, identity: &IdentityDisplay);

    fn apply_theme(&mut self, theme: Theme);
    fn reflect_settings(&mut self, settings: &Settings, panel: PanelState);

    /// Mirror the composer contents (cleared on submit).
    fn set_input(&mut self, text: &str);

    /// Discard all view state and start the view again from storage.
    fn reload(&mut self);
}

/// A view with nowhere to draw, for headless commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl ViewSink for NullView {
    fn append(&mut self, _entry: &RenderedEntry) {}
    fn remove(&mut self, _id: EntryId) {}
    fn clear(&mut self) {}
    fn scroll_to_latest(&mut self) {}
    fn relabel_user_avatars(&mut self, _initials: &str) {}
    fn show_identity(&mut self, _identity: &IdentityDisplay) {}
    fn apply_theme(&mut self, _theme: Theme) {}
    fn reflect_settings(&mut self, _settings: &Settings, _panel: PanelState) {}
    fn set_input(&mut self, _text: &str) {}
    fn reload(&mut self) {}
}
