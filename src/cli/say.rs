//! One-shot "say" command: one question, one answer, no chat view.

use std::error::Error;

use crate::api::ChatTransport;
use crate::core::client::ClientContext;
use crate::core::identity::IdentityProvider;
use crate::core::session::{ChatSession, CompletionOutcome, Submission};
use crate::core::settings::{Settings, SettingsStore, Theme};
use crate::core::view::{EntryId, IdentityDisplay, PanelState, RenderedEntry, ViewSink};

/// Keeps only the last settled counterpart entry.
#[derive(Debug, Default)]
pub struct ReplyCapture {
    reply: Option<RenderedEntry>,
}

impl ReplyCapture {
    pub fn reply(&self) -> Option<&RenderedEntry> {
        self.reply.as_ref()
    }
}

impl ViewSink for ReplyCapture {
    fn append(&mut self, entry: &RenderedEntry) {
        if entry.sender.is_bot() && !entry.pending {
            self.reply = Some(entry.clone());
        }
    }

    fn remove(&mut self, id: EntryId) {
        if self.reply.as_ref().is_some_and(|entry| entry.id == id) {
            self.reply = None;
        }
    }

    fn clear(&mut self) {
        self.reply = None;
    }

    fn scroll_to_latest(&mut self) {}
    fn relabel_user_avatars(&mut self, _initials: &str) {}
    fn show_identity(&mut self, _identity: &IdentityDisplay) {}
    fn apply_theme(&mut self, _theme: Theme) {}
    fn reflect_settings(&mut self, _settings: &Settings, _panel: PanelState) {}
    fn set_input(&mut self, _text: &str) {}
    fn reload(&mut self) {}
}

pub async fn run_say(ctx: &ClientContext, prompt: Vec<String>) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: guardian say <prompt>");
        std::process::exit(1);
    }

    let settings = SettingsStore::load(ctx.local_store()?).current().clone();
    let identity = ctx.identity()?;
    let transport = ctx.transport();

    let (outcome, text) = ask(&prompt, settings, &identity, &transport).await;
    match outcome {
        Some(CompletionOutcome::Replied) => {
            println!("{text}");
            Ok(())
        }
        _ => {
            eprintln!("❌ {text}");
            std::process::exit(1);
        }
    }
}

/// Runs one exchange through a session and returns what the view would show.
pub async fn ask(
    prompt: &str,
    settings: Settings,
    identity: &dyn IdentityProvider,
    transport: &dyn ChatTransport,
) -> (Option<CompletionOutcome>, String) {
    let mut session = ChatSession::new(ReplyCapture::default(), settings);
    session.set_identity(identity.resolve());
    session.set_input(prompt);

    let outcome = match session.submit(transport).await {
        Submission::Completed(outcome) => Some(outcome),
        Submission::Empty | Submission::Busy => None,
    };
    let text = session
        .view()
        .reply()
        .map(RenderedEntry::display_text)
        .unwrap_or_default();
    (outcome, text)
}
