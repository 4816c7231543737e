//! The chat session controller.
//!
//! A session moves `Idle -> Composing -> AwaitingResponse -> Idle`. Submitting
//! renders the user's message and a placeholder synchronously, then hands a
//! [`PendingExchange`] to whoever performs the network call. The result comes
//! back through [`ChatSession::complete`], which applies it only if the
//! exchange is still the current one.
//!
//! While an exchange is pending, further submissions are refused and the
//! composer keeps its text. Resetting or replacing the conversation abandons
//! the pending exchange; its late reply is dropped.

use tracing::{debug, warn};

use crate::api::{ChatApiError, ChatReply, ChatRequest, ChatTransport};
use crate::core::constants::FALLBACK_REPLY;
use crate::core::conversation::{Conversation, RenderContext};
use crate::core::identity::{display_for, Identity, IdentityProvider};
use crate::core::message::{HistoryEntry, Message};
use crate::core::settings::{self, Settings};
use crate::core::view::{EntryId, ViewSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Composing,
    AwaitingResponse,
}

/// Keys the composer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    /// `shift: true` inserts a line break instead of submitting.
    Enter { shift: bool },
}

#[derive(Debug)]
pub enum KeyOutcome {
    Edited,
    Submit(SubmitOutcome),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Nothing but whitespace in the composer; nothing happened.
    Empty,
    /// An exchange is already pending; the composer is untouched.
    Busy,
    Dispatched(PendingExchange),
}

/// A request that has been rendered locally and still has to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    pub request_id: u64,
    pub request: ChatRequest,
}

impl PendingExchange {
    pub async fn dispatch(self, transport: &dyn ChatTransport) -> ExchangeResult {
        let outcome = transport.send_chat(&self.request).await;
        ExchangeResult {
            request_id: self.request_id,
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct ExchangeResult {
    pub request_id: u64,
    pub outcome: Result<ChatReply, ChatApiError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Replied,
    /// The exchange failed and the fixed fallback text was shown.
    FellBack,
    /// The exchange was abandoned before its result arrived.
    Stale,
}

/// Result of the one-call [`ChatSession::submit`] convenience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Empty,
    Busy,
    Completed(CompletionOutcome),
}

#[derive(Debug, Clone)]
struct InFlight {
    request_id: u64,
    placeholder: EntryId,
    message: String,
}

pub struct ChatSession<V: ViewSink> {
    view: V,
    settings: Settings,
    identity: Option<Identity>,
    user_initials: String,
    conversation: Conversation,
    input: String,
    in_flight: Option<InFlight>,
    request_seq: u64,
    history: Vec<HistoryEntry>,
}

impl<V: ViewSink> ChatSession<V> {
    /// A session with an empty conversation and an anonymous user.
    pub fn new(view: V, settings: Settings) -> Self {
        Self {
            view,
            settings,
            identity: None,
            user_initials: display_for(None).initials,
            conversation: Conversation::new(),
            input: String::new(),
            in_flight: None,
            request_seq: 0,
            history: Vec::new(),
        }
    }

    /// Start-up sequence of the chat view: apply settings, resolve the
    /// identity once, seed the welcome message.
    pub fn mount(view: V, settings: Settings, identity: &dyn IdentityProvider) -> Self {
        let mut session = Self::new(view, settings);
        settings::apply(&session.settings, &mut session.view);
        session.set_identity(identity.resolve());
        session.reset();
        session
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Takes a new settings snapshot; later requests and renders use it.
    pub fn use_settings(&mut self, settings: Settings) {
        self.settings = settings;
        settings::apply(&self.settings, &mut self.view);
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn set_identity(&mut self, identity: Option<Identity>) {
        let display = display_for(identity.as_ref());
        self.user_initials = display.initials.clone();
        self.identity = identity;
        self.view.show_identity(&display);
        self.view.relabel_user_avatars(&self.user_initials);
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        if self.in_flight.is_some() {
            SessionState::AwaitingResponse
        } else if !self.input.is_empty() {
            SessionState::Composing
        } else {
            SessionState::Idle
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.view.set_input(&self.input);
    }

    pub fn handle_key(&mut self, key: KeyInput) -> KeyOutcome {
        match key {
            KeyInput::Char(c) => self.input.push(c),
            KeyInput::Backspace => {
                self.input.pop();
            }
            KeyInput::Enter { shift: true } => self.input.push('\n'),
            KeyInput::Enter { shift: false } => return KeyOutcome::Submit(self.begin_submit()),
        }
        self.view.set_input(&self.input);
        KeyOutcome::Edited
    }

    /// Renders the composer contents and a placeholder, and returns the
    /// request to send.
    pub fn begin_submit(&mut self) -> SubmitOutcome {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return SubmitOutcome::Empty;
        }
        if self.in_flight.is_some() {
            return SubmitOutcome::Busy;
        }

        self.set_input(String::new());
        let (conversation, ctx, view) = self.render_parts();
        conversation.render(Message::user(text.clone()), &ctx, view);
        let placeholder = conversation.render_placeholder(&ctx, view);

        self.request_seq += 1;
        let request_id = self.request_seq;
        let request = ChatRequest::new(text.clone(), &self.settings);
        self.in_flight = Some(InFlight {
            request_id,
            placeholder,
            message: text,
        });
        debug!(request_id, "chat exchange started");

        SubmitOutcome::Dispatched(PendingExchange {
            request_id,
            request,
        })
    }

    /// Replaces the placeholder with the reply, or with the fallback text.
    pub fn complete(&mut self, result: ExchangeResult) -> CompletionOutcome {
        let in_flight = match self.in_flight.take() {
            Some(in_flight) if in_flight.request_id == result.request_id => in_flight,
            other => {
                self.in_flight = other;
                debug!(request_id = result.request_id, "dropping reply for abandoned exchange");
                return CompletionOutcome::Stale;
            }
        };

        let (conversation, ctx, view) = self.render_parts();
        conversation.remove(in_flight.placeholder, view);

        match result.outcome {
            Ok(reply) => {
                conversation.render(Message::bot(reply.reply.clone()), &ctx, view);
                self.history
                    .push(HistoryEntry::new(in_flight.message, reply.reply));
                CompletionOutcome::Replied
            }
            Err(err) => {
                warn!(request_id = result.request_id, "chat exchange failed: {err}");
                conversation.render(Message::bot(FALLBACK_REPLY), &ctx, view);
                CompletionOutcome::FellBack
            }
        }
    }

    /// Submits the composer contents and waits for the exchange to finish.
    pub async fn submit(&mut self, transport: &dyn ChatTransport) -> Submission {
        match self.begin_submit() {
            SubmitOutcome::Empty => Submission::Empty,
            SubmitOutcome::Busy => Submission::Busy,
            SubmitOutcome::Dispatched(pending) => {
                let result = pending.dispatch(transport).await;
                Submission::Completed(self.complete(result))
            }
        }
    }

    /// Clears the view back to the welcome message. Settings are untouched.
    pub fn reset(&mut self) {
        self.abandon_in_flight();
        let (conversation, ctx, view) = self.render_parts();
        conversation.reset(&ctx, view);
    }

    /// Replaces the whole conversation with `messages`.
    pub fn replace_conversation(&mut self, messages: Vec<Message>) {
        self.abandon_in_flight();
        let (conversation, ctx, view) = self.render_parts();
        conversation.replace_with(messages, &ctx, view);
    }

    /// Drops all local state tied to the server session and asks the view to
    /// start over.
    pub fn reload(&mut self) {
        self.abandon_in_flight();
        self.history.clear();
        self.view.reload();
    }

    fn abandon_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(request_id = in_flight.request_id, "abandoning pending exchange");
        }
    }

    fn render_parts(&mut self) -> (&mut Conversation, RenderContext<'_>, &mut V) {
        let ctx = RenderContext {
            show_disclaimer: self.settings.show_disclaimer,
            user_initials: &self.user_initials,
        };
        (&mut self.conversation, ctx, &mut self.view)
    }
}
