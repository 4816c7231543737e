//! Line-oriented terminal rendering of a chat session.
//!
//! Entries are printed as they are appended. Without cursor control a printed
//! line cannot be taken back, so removal only erases the most recent entry
//! (the pending placeholder) and only when ANSI output is enabled. Lines
//! printed below that entry (notices, typed input) are tracked so they can be
//! redrawn after the erase.

use std::io::{self, IsTerminal, Stdout, Write};

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::core::constants::COUNTERPART_NAME;
use crate::core::settings::{Settings, Theme};
use crate::core::view::{
    Avatar, EntryId, IdentityDisplay, Layout, PanelState, RenderedEntry, ViewSink,
};
use crate::ui::theme::{paint, paint_bold, Palette};

const DEFAULT_WIDTH: usize = 80;
const LABEL_SEPARATOR: &str = " ▸ ";

#[derive(Debug, Clone)]
struct BelowLine {
    text: String,
    /// Echoed by the terminal while typing a message not yet sent.
    echo: bool,
}

pub struct TerminalView<W: Write> {
    out: W,
    palette: Palette,
    ansi: bool,
    width: usize,
    /// Id and printed height of the most recent entry.
    last_entry: Option<(EntryId, usize)>,
    /// Lines on screen below the most recent entry, oldest first.
    below: Vec<BelowLine>,
    /// Typed lines erased with a placeholder, redrawn after the next entry.
    held_echo: Vec<String>,
    identity: Option<IdentityDisplay>,
    reload_requested: bool,
}

impl TerminalView<Stdout> {
    pub fn stdout() -> Self {
        let ansi = io::stdout().is_terminal();
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|value| value.parse().ok())
            .filter(|width: &usize| *width >= 20)
            .unwrap_or(DEFAULT_WIDTH);
        Self::new(io::stdout(), ansi, width)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, ansi: bool, width: usize) -> Self {
        Self {
            out,
            palette: Palette::light(),
            ansi,
            width,
            last_entry: None,
            below: Vec::new(),
            held_echo: Vec::new(),
            identity: None,
            reload_requested: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn identity(&self) -> Option<&IdentityDisplay> {
        self.identity.as_ref()
    }

    /// True once after the view asked to be started over.
    pub fn take_reload(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    /// Prints a line outside the conversation (command output, prompts).
    pub fn notice(&mut self, text: &str) {
        let lines: Vec<String> = text
            .lines()
            .map(|line| paint(line, self.palette.notice, self.ansi))
            .collect();
        self.print_below(lines);
    }

    /// Records a line the terminal echoed while the user typed it.
    pub fn record_input_echo(&mut self, line: &str) {
        self.below.push(BelowLine {
            text: line.to_string(),
            echo: true,
        });
    }

    /// Leaves the echoed input on screen for good (commands, answers).
    pub fn keep_input_echo(&mut self) {
        for line in &mut self.below {
            line.echo = false;
        }
    }

    /// Removes the lines the terminal echoed while the user typed, so the
    /// submitted message is only shown once. Anything printed after the
    /// first echoed line is redrawn.
    pub fn erase_input_echo(&mut self) {
        let Some(first) = self.below.iter().position(|line| line.echo) else {
            return;
        };
        if !self.ansi {
            self.keep_input_echo();
            return;
        }
        let erased = self.below.split_off(first);
        self.write_raw(&format!("\x1b[{}A\x1b[J", erased.len()));
        let kept: Vec<String> = erased
            .into_iter()
            .filter(|line| !line.echo)
            .map(|line| line.text)
            .collect();
        self.print_below(kept);
    }

    pub fn prompt(&mut self, question: &str) {
        self.notice(&format!("{question} [y/N]"));
    }

    pub fn format_entry(&self, entry: &RenderedEntry) -> Vec<String> {
        let (label, label_color, text_color) = match &entry.avatar {
            Avatar::Initials(initials) => (
                format!("[{initials}]"),
                self.palette.user_label,
                self.palette.user_text,
            ),
            Avatar::Icon(_) => (
                COUNTERPART_NAME.to_string(),
                self.palette.bot_label,
                self.palette.bot_text,
            ),
        };
        let text_color = if entry.pending {
            self.palette.placeholder
        } else {
            text_color
        };

        let mut lines = Vec::with_capacity(entry.lines.len() + 3);
        match entry.layout {
            Layout::Counterpart => {
                let indent = " ".repeat(grapheme_len(&label) + grapheme_len(LABEL_SEPARATOR));
                for (index, line) in entry.lines.iter().enumerate() {
                    let body = paint(line, text_color, self.ansi);
                    if index == 0 {
                        lines.push(format!(
                            "{}{LABEL_SEPARATOR}{body}",
                            paint_bold(&label, label_color, self.ansi)
                        ));
                    } else {
                        lines.push(format!("{indent}{body}"));
                    }
                }
                if let Some(disclaimer) = entry.disclaimer {
                    lines.push(String::new());
                    lines.push(format!(
                        "{indent}{}",
                        paint(disclaimer, self.palette.disclaimer, self.ansi)
                    ));
                }
            }
            Layout::OwnSide => {
                // The label sits after the last line; earlier lines keep its width.
                let suffix_len = grapheme_len(" ◂ ") + grapheme_len(&label);
                let last = entry.lines.len().saturating_sub(1);
                for (index, line) in entry.lines.iter().enumerate() {
                    let pad = " ".repeat(self.width.saturating_sub(grapheme_len(line) + suffix_len));
                    let tail = if index == last {
                        format!(" ◂ {}", paint_bold(&label, label_color, self.ansi))
                    } else {
                        " ".repeat(suffix_len)
                    };
                    lines.push(format!("{pad}{}{tail}", paint(line, text_color, self.ansi)));
                }
            }
        }
        lines.push(String::new());
        lines
    }

    fn print_identity(&mut self, identity: &IdentityDisplay) {
        let text = match &identity.name {
            Some(name) => format!("Signed in as {name} [{}]", identity.initials),
            None => "Not signed in".to_string(),
        };
        self.notice(&text);
    }

    pub fn format_panel(settings: &Settings, panel: PanelState) -> String {
        let mut text = format!(
            "Settings{}: theme={} speed={} disclaimer={}",
            if panel.open { " (unsaved)" } else { "" },
            settings.theme.as_str(),
            settings.speed.as_str(),
            if settings.show_disclaimer { "on" } else { "off" },
        );
        if panel.api_key_visible {
            let key = if settings.api_key.is_empty() {
                "(empty)"
            } else {
                "(set)"
            };
            text.push_str(&format!(" api-key={key}"));
        }
        text
    }

    fn print_below(&mut self, lines: Vec<String>) {
        self.write_lines(&lines);
        self.below
            .extend(lines.into_iter().map(|text| BelowLine { text, echo: false }));
    }

    fn write_lines(&mut self, lines: &[String]) {
        let result = lines
            .iter()
            .try_for_each(|line| writeln!(self.out, "{line}"))
            .and_then(|_| self.out.flush());
        if let Err(err) = result {
            debug!("terminal write failed: {err}");
        }
    }

    fn write_raw(&mut self, text: &str) {
        if let Err(err) = write!(self.out, "{text}").and_then(|_| self.out.flush()) {
            debug!("terminal write failed: {err}");
        }
    }
}

fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

impl<W: Write> ViewSink for TerminalView<W> {
    fn append(&mut self, entry: &RenderedEntry) {
        let lines = self.format_entry(entry);
        self.write_lines(&lines);
        self.last_entry = Some((entry.id, lines.len()));

        let held = std::mem::take(&mut self.held_echo);
        self.write_lines(&held);
        self.below = held
            .into_iter()
            .map(|text| BelowLine { text, echo: true })
            .collect();
    }

    fn remove(&mut self, id: EntryId) {
        match self.last_entry.take() {
            Some((last, height)) if last == id && self.ansi => {
                let below = std::mem::take(&mut self.below);
                self.write_raw(&format!("\x1b[{}A\x1b[J", height + below.len()));
                let (echo, printed): (Vec<BelowLine>, Vec<BelowLine>) =
                    below.into_iter().partition(|line| line.echo);
                self.print_below(printed.into_iter().map(|line| line.text).collect());
                self.held_echo = echo.into_iter().map(|line| line.text).collect();
            }
            other => self.last_entry = other,
        }
    }

    fn clear(&mut self) {
        self.last_entry = None;
        self.below.clear();
        self.held_echo.clear();
        if self.ansi {
            self.write_raw("\x1b[2J\x1b[H");
            if let Some(identity) = self.identity.clone() {
                self.print_identity(&identity);
            }
        } else {
            let rule = "─".repeat(self.width);
            self.write_lines(&[rule]);
        }
    }

    fn scroll_to_latest(&mut self) {
        // Output already ends at the newest entry.
    }

    fn relabel_user_avatars(&mut self, _initials: &str) {
        // Printed lines are final; new entries carry the new initials.
    }

    fn show_identity(&mut self, identity: &IdentityDisplay) {
        self.identity = Some(identity.clone());
        self.print_identity(identity);
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.palette = Palette::for_theme(theme);
    }

    fn reflect_settings(&mut self, settings: &Settings, panel: PanelState) {
        if panel.open {
            let text = paint(&Self::format_panel(settings, panel), self.palette.panel, self.ansi);
            self.print_below(vec![text]);
        }
    }

    fn set_input(&mut self, _text: &str) {
        // The terminal echoes what the user types.
    }

    fn reload(&mut self) {
        self.reload_requested = true;
    }
}
