mod registry;

pub use registry::{all_commands, find_command, Command, CommandInvocation, CommandKind};

use crate::core::app::App;
use crate::core::settings::{Speed, Theme};
use crate::core::storage::LocalStore;
use crate::core::view::ViewSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    /// Text for the user that is not part of the conversation.
    Notice(String),
    ProcessAsMessage(String),
    /// Ask first; run the action only on an explicit yes.
    Confirm(PendingAction),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    ResetView,
    ClearHistory,
}

impl PendingAction {
    pub fn question(self) -> &'static str {
        match self {
            PendingAction::ResetView => "Clear current view?",
            PendingAction::ClearHistory => "Clear all session history?",
        }
    }
}

pub fn process_input<V: ViewSink, S: LocalStore>(app: &mut App<V, S>, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = rest.splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    let Some(command) = find_command(command_name) else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };
    let invocation = CommandInvocation {
        input: trimmed,
        args,
    };

    match command.kind {
        CommandKind::Help => handle_help(),
        CommandKind::Settings => handle_settings(app),
        CommandKind::Theme => handle_theme(app, invocation),
        CommandKind::Speed => handle_speed(app, invocation),
        CommandKind::ApiKey => handle_api_key(app, invocation),
        CommandKind::Disclaimer => handle_disclaimer(app, invocation),
        CommandKind::Save => handle_save(app),
        CommandKind::Cancel => handle_cancel(app),
        CommandKind::Reset => CommandResult::Confirm(PendingAction::ResetView),
        CommandKind::History => handle_history(app),
        CommandKind::Load => handle_load(app, invocation),
        CommandKind::ClearHistory => CommandResult::Confirm(PendingAction::ClearHistory),
        CommandKind::Whoami => handle_whoami(app),
        CommandKind::Quit => CommandResult::Quit,
    }
}

fn usage_error(invocation: CommandInvocation<'_>, expected: &str) -> CommandResult {
    CommandResult::Notice(format!(
        "Cannot understand \"{}\". Usage: {expected}",
        invocation.input
    ))
}

fn handle_help() -> CommandResult {
    let mut help = String::from(
        "Enter sends a message. End a line with \\ to continue on the next line.\n\nCommands:",
    );
    for command in all_commands() {
        help.push_str(&format!("\n  {:<24} {}", command.usage, command.help));
    }
    CommandResult::Notice(help)
}

fn handle_settings<V: ViewSink, S: LocalStore>(app: &mut App<V, S>) -> CommandResult {
    app.edit_settings();
    CommandResult::Continue
}

fn handle_theme<V: ViewSink, S: LocalStore>(
    app: &mut App<V, S>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let Some(theme) = Theme::parse(invocation.args) else {
        return usage_error(invocation, "/theme <light|dark>");
    };
    let (panel, view) = app.edit_settings();
    panel.set_theme(theme, view);
    CommandResult::Continue
}

fn handle_speed<V: ViewSink, S: LocalStore>(
    app: &mut App<V, S>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let Some(speed) = Speed::parse(invocation.args) else {
        return usage_error(invocation, "/speed <Detailed|Fast>");
    };
    let (panel, view) = app.edit_settings();
    panel.set_speed(speed, view);
    CommandResult::Continue
}

fn handle_api_key<V: ViewSink, S: LocalStore>(
    app: &mut App<V, S>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let (panel, view) = app.edit_settings();
    match panel.set_api_key(invocation.args, view) {
        Ok(()) => CommandResult::Continue,
        Err(err) => CommandResult::Notice(format!("{err}. Use /speed Fast first.")),
    }
}

fn handle_disclaimer<V: ViewSink, S: LocalStore>(
    app: &mut App<V, S>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let (panel, view) = app.edit_settings();
    let show = match invocation.args.to_ascii_lowercase().as_str() {
        "" => !panel.draft().show_disclaimer,
        "on" | "true" | "yes" => true,
        "off" | "false" | "no" => false,
        _ => return usage_error(invocation, "/disclaimer [on|off]"),
    };
    panel.set_show_disclaimer(show, view);
    CommandResult::Continue
}

fn handle_save<V: ViewSink, S: LocalStore>(app: &mut App<V, S>) -> CommandResult {
    if !app.panel().is_open() {
        return CommandResult::Notice("No settings changes to save.".to_string());
    }
    match app.save_settings() {
        Ok(()) => CommandResult::Notice("Settings saved.".to_string()),
        Err(err) => CommandResult::Notice(format!("Settings were not saved: {err}")),
    }
}

fn handle_cancel<V: ViewSink, S: LocalStore>(app: &mut App<V, S>) -> CommandResult {
    if !app.panel().is_open() {
        return CommandResult::Continue;
    }
    app.cancel_settings();
    CommandResult::Notice("Settings changes discarded.".to_string())
}

fn handle_history<V: ViewSink, S: LocalStore>(app: &mut App<V, S>) -> CommandResult {
    let history = app.history();
    let recent = history.recent();
    if recent.is_empty() {
        return CommandResult::Notice("No exchanges yet.".to_string());
    }
    let mut listing = String::from("Recent exchanges:");
    for (index, entry) in recent.iter().enumerate() {
        listing.push_str(&format!(
            "\n  {}. {} ({})",
            index + 1,
            entry.summary,
            entry.recorded_at.format("%Y-%m-%d %H:%M")
        ));
    }
    CommandResult::Notice(listing)
}

fn handle_load<V: ViewSink, S: LocalStore>(
    app: &mut App<V, S>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let Some(index) = invocation
        .args
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
    else {
        return usage_error(invocation, "/load <n>");
    };
    if app.history().load_recent(index) {
        CommandResult::Continue
    } else {
        CommandResult::Notice(format!(
            "There is no exchange {}. See /history.",
            invocation.args
        ))
    }
}

fn handle_whoami<V: ViewSink, S: LocalStore>(app: &mut App<V, S>) -> CommandResult {
    let text = match app.session().identity() {
        Some(identity) if identity.role.is_empty() => {
            format!("Signed in as {} (id {})", identity.name, identity.id)
        }
        Some(identity) => format!(
            "Signed in as {} (id {}, {})",
            identity.name, identity.id, identity.role
        ),
        None => "Not signed in. Your messages are shown as anonymous.".to_string(),
    };
    CommandResult::Notice(text)
}

#[cfg(test)]
mod tests;
