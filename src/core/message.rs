use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::constants::HISTORY_SUMMARY_CHARS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    pub fn is_user(self) -> bool {
        self == Sender::User
    }

    pub fn is_bot(self) -> bool {
        self == Sender::Bot
    }
}

impl TryFrom<&str> for Sender {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            _ => Err(format!("invalid sender: {value}")),
        }
    }
}

/// One conversation entry. Position in the conversation is its only ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    pub fn is_user(&self) -> bool {
        self.sender.is_user()
    }

    pub fn is_bot(&self) -> bool {
        self.sender.is_bot()
    }
}

/// A completed user/bot exchange kept for the recent-history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub summary: String,
    pub user: String,
    pub bot: String,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        let user = user.into();
        Self {
            summary: summarize(&user),
            user,
            bot: bot.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Shortens a user question to a sidebar-sized label.
pub fn summarize(text: &str) -> String {
    if text.chars().count() > HISTORY_SUMMARY_CHARS {
        let head: String = text.chars().take(HISTORY_SUMMARY_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_questions_are_not_ellipsized() {
        assert_eq!(summarize("What is Section 420?"), "What is Section 420?");
    }

    #[test]
    fn long_questions_keep_thirty_characters() {
        let summary = summarize("Can my landlord keep the deposit after I moved out early?");
        assert_eq!(summary, "Can my landlord keep the depos...");
    }

    #[test]
    fn summary_counts_characters_not_bytes() {
        let text = "धारा ४२० के तहत क्या सजा है और जमानत कैसे मिलती है";
        let summary = summarize(text);
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), HISTORY_SUMMARY_CHARS + 3);
    }

    #[test]
    fn sender_round_trips_through_wire_names() {
        assert_eq!(Sender::try_from("bot"), Ok(Sender::Bot));
        assert_eq!(Sender::User.as_str(), "user");
        assert!(Sender::try_from("assistant").is_err());
    }
}
