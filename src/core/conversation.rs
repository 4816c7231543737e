//! Ordered conversation state and how each message turns into a view entry.

use crate::core::constants::{COUNTERPART_ICON, DISCLAIMER, PLACEHOLDER_TEXT, WELCOME_MESSAGE};
use crate::core::message::{Message, Sender};
use crate::core::view::{Avatar, EntryId, Layout, RenderedEntry, ViewSink};

/// Display inputs that come from settings and identity rather than the message.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub show_disclaimer: bool,
    pub user_initials: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub id: EntryId,
    pub message: Message,
    pub pending: bool,
}

#[derive(Debug, Default)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
    next_id: EntryId,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    /// Settled messages in display order; the placeholder is not a message.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries
            .iter()
            .filter(|entry| !entry.pending)
            .map(|entry| &entry.message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn render<V: ViewSink + ?Sized>(
        &mut self,
        message: Message,
        ctx: &RenderContext<'_>,
        view: &mut V,
    ) -> EntryId {
        self.push(message, false, ctx, view)
    }

    /// Appends the transient counterpart entry shown while a reply is pending.
    pub fn render_placeholder<V: ViewSink + ?Sized>(
        &mut self,
        ctx: &RenderContext<'_>,
        view: &mut V,
    ) -> EntryId {
        self.push(Message::bot(PLACEHOLDER_TEXT), true, ctx, view)
    }

    /// Removes an entry; returns false if it was already gone.
    pub fn remove<V: ViewSink + ?Sized>(&mut self, id: EntryId, view: &mut V) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        self.entries.remove(index);
        view.remove(id);
        true
    }

    pub fn clear<V: ViewSink + ?Sized>(&mut self, view: &mut V) {
        self.entries.clear();
        view.clear();
    }

    /// Clears everything and re-seeds the counterpart's welcome message.
    pub fn reset<V: ViewSink + ?Sized>(&mut self, ctx: &RenderContext<'_>, view: &mut V) {
        self.clear(view);
        self.render(Message::bot(WELCOME_MESSAGE), ctx, view);
    }

    /// Wholesale replacement with `messages`, rendered in order.
    pub fn replace_with<V: ViewSink + ?Sized>(
        &mut self,
        messages: impl IntoIterator<Item = Message>,
        ctx: &RenderContext<'_>,
        view: &mut V,
    ) {
        self.clear(view);
        for message in messages {
            self.render(message, ctx, view);
        }
    }

    fn push<V: ViewSink + ?Sized>(
        &mut self,
        message: Message,
        pending: bool,
        ctx: &RenderContext<'_>,
        view: &mut V,
    ) -> EntryId {
        self.next_id += 1;
        let id = self.next_id;
        let entry = build_entry(id, &message, pending, ctx);
        self.entries.push(ConversationEntry {
            id,
            message,
            pending,
        });
        view.append(&entry);
        view.scroll_to_latest();
        id
    }
}

/// Splits message text at embedded line breaks, `\r\n` included.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

pub fn build_entry(
    id: EntryId,
    message: &Message,
    pending: bool,
    ctx: &RenderContext<'_>,
) -> RenderedEntry {
    let (layout, avatar) = match message.sender {
        Sender::User => (
            Layout::OwnSide,
            Avatar::Initials(ctx.user_initials.to_string()),
        ),
        Sender::Bot => (Layout::Counterpart, Avatar::Icon(COUNTERPART_ICON)),
    };
    let disclaimer = (message.is_bot() && ctx.show_disclaimer && !pending).then_some(DISCLAIMER);

    RenderedEntry {
        id,
        sender: message.sender,
        layout,
        avatar,
        lines: normalize_lines(&message.text),
        disclaimer,
        pending,
    }
}
