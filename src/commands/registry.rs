#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Settings,
    Theme,
    Speed,
    ApiKey,
    Disclaimer,
    Save,
    Cancel,
    Reset,
    History,
    Load,
    ClearHistory,
    Whoami,
    Quit,
}

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub kind: CommandKind,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        kind: CommandKind::Help,
    },
    Command {
        name: "settings",
        usage: "/settings",
        help: "Open the settings panel.",
        kind: CommandKind::Settings,
    },
    Command {
        name: "theme",
        usage: "/theme <light|dark>",
        help: "Change the theme in the settings draft.",
        kind: CommandKind::Theme,
    },
    Command {
        name: "speed",
        usage: "/speed <Detailed|Fast>",
        help: "Change the response speed in the settings draft.",
        kind: CommandKind::Speed,
    },
    Command {
        name: "api-key",
        usage: "/api-key [key]",
        help: "Set the API key used in Fast mode; no key clears it.",
        kind: CommandKind::ApiKey,
    },
    Command {
        name: "disclaimer",
        usage: "/disclaimer [on|off]",
        help: "Show or hide the legal disclaimer under replies.",
        kind: CommandKind::Disclaimer,
    },
    Command {
        name: "save",
        usage: "/save",
        help: "Save the settings draft and close the panel.",
        kind: CommandKind::Save,
    },
    Command {
        name: "cancel",
        usage: "/cancel",
        help: "Discard the settings draft and close the panel.",
        kind: CommandKind::Cancel,
    },
    Command {
        name: "reset",
        usage: "/reset",
        help: "Clear the current view back to the welcome message.",
        kind: CommandKind::Reset,
    },
    Command {
        name: "history",
        usage: "/history",
        help: "List the most recent exchanges of this session.",
        kind: CommandKind::History,
    },
    Command {
        name: "load",
        usage: "/load <n>",
        help: "Show exchange n from /history on its own.",
        kind: CommandKind::Load,
    },
    Command {
        name: "clear-history",
        usage: "/clear-history",
        help: "Delete all session history on the server and start over.",
        kind: CommandKind::ClearHistory,
    },
    Command {
        name: "whoami",
        usage: "/whoami",
        help: "Show who the conversation is attributed to.",
        kind: CommandKind::Whoami,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        kind: CommandKind::Quit,
    },
];
