use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::api::{ChatApiError, ChatReply, ChatRequest, ChatTransport};
use crate::core::settings::{Settings, Theme};
use crate::core::view::{EntryId, IdentityDisplay, PanelState, RenderedEntry, ViewSink};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Append(RenderedEntry),
    Remove(EntryId),
    Clear,
    Scroll,
    Relabel(String),
    Identity(IdentityDisplay),
    Theme(Theme),
    Settings(Settings, PanelState),
    Input(String),
    Reload,
}

/// A view that records every call and keeps the visible entries in order.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
    visible: Vec<RenderedEntry>,
}

impl RecordingView {
    pub fn entries(&self) -> &[RenderedEntry] {
        &self.visible
    }

    /// Visible entries as the user would read them, disclaimer included.
    pub fn texts(&self) -> Vec<String> {
        self.visible.iter().map(RenderedEntry::display_text).collect()
    }

    pub fn last_panel(&self) -> Option<PanelState> {
        self.events.iter().rev().find_map(|event| match event {
            ViewEvent::Settings(_, panel) => Some(*panel),
            _ => None,
        })
    }

    pub fn count(&self, predicate: impl Fn(&ViewEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }
}

impl ViewSink for RecordingView {
    fn append(&mut self, entry: &RenderedEntry) {
        self.visible.push(entry.clone());
        self.events.push(ViewEvent::Append(entry.clone()));
    }

    fn remove(&mut self, id: EntryId) {
        self.visible.retain(|entry| entry.id != id);
        self.events.push(ViewEvent::Remove(id));
    }

    fn clear(&mut self) {
        self.visible.clear();
        self.events.push(ViewEvent::Clear);
    }

    fn scroll_to_latest(&mut self) {
        self.events.push(ViewEvent::Scroll);
    }

    fn relabel_user_avatars(&mut self, initials: &str) {
        self.events.push(ViewEvent::Relabel(initials.to_string()));
    }

    fn show_identity(&mut self, identity: &IdentityDisplay) {
        self.events.push(ViewEvent::Identity(identity.clone()));
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.events.push(ViewEvent::Theme(theme));
    }

    fn reflect_settings(&mut self, settings: &Settings, panel: PanelState) {
        self.events
            .push(ViewEvent::Settings(settings.clone(), panel));
    }

    fn set_input(&mut self, text: &str) {
        self.events.push(ViewEvent::Input(text.to_string()));
    }

    fn reload(&mut self) {
        self.events.push(ViewEvent::Reload);
    }
}

/// Transport that answers from a script and remembers what it was asked.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<ChatReply, ChatApiError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    clear_calls: AtomicUsize,
    fail_clear: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(reply: &str) -> Self {
        let transport = Self::new();
        transport.push_reply(reply);
        transport
    }

    pub fn failing(error: ChatApiError) -> Self {
        let transport = Self::new();
        transport.push_error(error);
        transport
    }

    pub fn with_failing_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(ChatReply {
            reply: reply.to_string(),
        }));
    }

    pub fn push_error(&self, error: ChatApiError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ChatApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatApiError::Decode("no scripted reply".into())))
    }

    async fn clear_history(&self) -> Result<(), ChatApiError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_clear {
            Err(ChatApiError::Status {
                status: 500,
                body: "purge failed".into(),
            })
        } else {
            Ok(())
        }
    }
}

pub fn server_error() -> ChatApiError {
    ChatApiError::Status {
        status: 500,
        body: "Traceback (most recent call last): KeyError 'reply'".into(),
    }
}
