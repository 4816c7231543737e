//! Restoring past exchanges and purging the server-side history.

use tracing::{debug, warn};

use crate::api::ChatTransport;
use crate::core::constants::RECENT_HISTORY_LEN;
use crate::core::message::{HistoryEntry, Message};
use crate::core::session::ChatSession;
use crate::core::view::ViewSink;

/// Whether the user agreed to an irreversible action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Granted,
    Declined,
}

impl Confirmation {
    /// Interprets a typed answer; only an explicit yes counts.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Confirmation::Granted,
            _ => Confirmation::Declined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Nothing was sent and the view is untouched.
    Declined,
    Purged,
    /// The purge request failed; the view was reloaded anyway.
    PurgeFailed,
}

pub struct HistoryController<'a, V: ViewSink> {
    session: &'a mut ChatSession<V>,
}

impl<'a, V: ViewSink> HistoryController<'a, V> {
    pub fn new(session: &'a mut ChatSession<V>) -> Self {
        Self { session }
    }

    /// Replaces the visible conversation with exactly one user/bot pair.
    pub fn load_history(&mut self, user_text: &str, bot_text: &str) {
        debug!("restoring a past exchange");
        self.session
            .replace_conversation(vec![Message::user(user_text), Message::bot(bot_text)]);
    }

    /// The most recent exchanges, oldest first.
    pub fn recent(&self) -> &[HistoryEntry] {
        let history = self.session.history();
        &history[history.len().saturating_sub(RECENT_HISTORY_LEN)..]
    }

    /// Restores entry `index` of [`recent`](Self::recent). Returns false when
    /// there is no such entry.
    pub fn load_recent(&mut self, index: usize) -> bool {
        let Some(entry) = self.recent().get(index).cloned() else {
            return false;
        };
        self.load_history(&entry.user, &entry.bot);
        true
    }

    /// Purges the server-side history and reloads the view. Once confirmed,
    /// the reload happens whether or not the purge succeeded.
    pub async fn clear_history(
        &mut self,
        confirmation: Confirmation,
        transport: &dyn ChatTransport,
    ) -> ClearOutcome {
        if confirmation == Confirmation::Declined {
            return ClearOutcome::Declined;
        }

        let outcome = match transport.clear_history().await {
            Ok(()) => ClearOutcome::Purged,
            Err(err) => {
                warn!("clearing server history failed: {err}");
                ClearOutcome::PurgeFailed
            }
        };
        self.session.reload();
        outcome
    }
}
