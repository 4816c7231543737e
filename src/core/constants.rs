//! Fixed strings and storage keys shared by the chat view.

/// Greeting re-seeded from the counterpart whenever the view is reset.
pub const WELCOME_MESSAGE: &str =
    "Hello! I am Guardian, your legal AI assistant. How can I help you with Indian Law today?";

/// Advisory appended to counterpart messages at display time.
pub const DISCLAIMER: &str = "Disclaimer: This response is for informational purposes only and should not be considered legal advice.";

/// Text of the transient counterpart entry shown while a request is in flight.
pub const PLACEHOLDER_TEXT: &str = "Thinking...";

/// The only failure text a user ever sees for a chat exchange.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Avatar image used for every counterpart entry.
pub const COUNTERPART_ICON: &str = "/chatbot/Guardian.png";

pub const COUNTERPART_NAME: &str = "Guardian";

/// Initials shown on user entries when nobody is signed in.
pub const ANONYMOUS_INITIALS: &str = "U";

/// Local storage key holding the serialized settings record.
pub const SETTINGS_KEY: &str = "guardianSettings";

/// Cookie name and local storage key written by the sign-in flow.
pub const IDENTITY_KEY: &str = "guardianUser";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Number of exchanges listed by the recent-history view.
pub const RECENT_HISTORY_LEN: usize = 5;

/// Character budget for a history summary before it is ellipsized.
pub const HISTORY_SUMMARY_CHARS: usize = 30;
