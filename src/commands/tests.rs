use super::*;
use crate::core::constants::SETTINGS_KEY;
use crate::core::identity::Anonymous;
use crate::core::session::{ExchangeResult, SubmitOutcome};
use crate::core::storage::MemoryStore;
use crate::api::ChatReply;
use crate::utils::test_utils::RecordingView;

fn test_app() -> App<RecordingView, MemoryStore> {
    App::mount(RecordingView::default(), MemoryStore::new(), &Anonymous)
}

fn notice(result: CommandResult) -> String {
    match result {
        CommandResult::Notice(text) => text,
        other => panic!("expected a notice, got {other:?}"),
    }
}

fn record_exchange(app: &mut App<RecordingView, MemoryStore>, question: &str, answer: &str) {
    let session = app.session_mut();
    session.set_input(question);
    let SubmitOutcome::Dispatched(pending) = session.begin_submit() else {
        panic!("submission was not dispatched");
    };
    session.complete(ExchangeResult {
        request_id: pending.request_id,
        outcome: Ok(ChatReply {
            reply: answer.to_string(),
        }),
    });
}

#[test]
fn registry_lists_commands() {
    let names: Vec<_> = all_commands().iter().map(|command| command.name).collect();
    for expected in ["help", "settings", "save", "reset", "clear-history", "quit"] {
        assert!(names.contains(&expected), "missing /{expected}");
    }
}

#[test]
fn help_mentions_every_command() {
    let help = notice(process_input(&mut test_app(), "/help"));
    for command in all_commands() {
        assert!(help.contains(command.usage), "help lacks {}", command.usage);
    }
}

#[test]
fn commands_dispatch_case_insensitively() {
    let mut app = test_app();
    assert_eq!(process_input(&mut app, "/QUIT"), CommandResult::Quit);
}

#[test]
fn plain_text_and_unknown_commands_are_messages() {
    let mut app = test_app();
    assert_eq!(
        process_input(&mut app, "What is Section 420?"),
        CommandResult::ProcessAsMessage("What is Section 420?".into())
    );
    assert_eq!(
        process_input(&mut app, "/section420"),
        CommandResult::ProcessAsMessage("/section420".into())
    );
}

#[test]
fn settings_edits_stay_in_draft_until_saved() {
    let mut app = test_app();
    assert_eq!(process_input(&mut app, "/theme dark"), CommandResult::Continue);
    assert_eq!(process_input(&mut app, "/speed fast"), CommandResult::Continue);
    assert_eq!(process_input(&mut app, "/api-key k-123"), CommandResult::Continue);

    assert!(app.panel().is_open());
    assert_eq!(app.persisted_settings().theme, Theme::Light);

    assert_eq!(notice(process_input(&mut app, "/save")), "Settings saved.");
    assert_eq!(app.persisted_settings().theme, Theme::Dark);
    assert_eq!(app.session().settings().speed, Speed::Fast);
    assert_eq!(app.session().settings().api_key, "k-123");
    assert!(!app.panel().is_open());
}

#[test]
fn api_key_is_refused_in_detailed_mode() {
    let mut app = test_app();
    let text = notice(process_input(&mut app, "/api-key secret"));
    assert!(text.contains("Fast"));
    assert_eq!(app.panel().draft().api_key, "");
}

#[test]
fn cancel_keeps_the_persisted_settings() {
    let mut app = test_app();
    process_input(&mut app, "/disclaimer off");
    assert!(!app.panel().draft().show_disclaimer);

    notice(process_input(&mut app, "/cancel"));
    assert!(app.persisted_settings().show_disclaimer);
    assert!(app.session().settings().show_disclaimer);
    let (_, store) = app.into_parts();
    assert_eq!(store.get(SETTINGS_KEY).expect("get failed"), None);
}

#[test]
fn bad_arguments_explain_usage() {
    let mut app = test_app();
    assert!(notice(process_input(&mut app, "/theme purple")).contains("/theme <light|dark>"));
    assert!(notice(process_input(&mut app, "/load zero")).contains("/load <n>"));
}

#[test]
fn destructive_commands_ask_first() {
    let mut app = test_app();
    assert_eq!(
        process_input(&mut app, "/reset"),
        CommandResult::Confirm(PendingAction::ResetView)
    );
    assert_eq!(
        process_input(&mut app, "/clear-history"),
        CommandResult::Confirm(PendingAction::ClearHistory)
    );
    assert_eq!(PendingAction::ClearHistory.question(), "Clear all session history?");
}

#[test]
fn history_lists_and_loads_exchanges() {
    let mut app = test_app();
    assert_eq!(notice(process_input(&mut app, "/history")), "No exchanges yet.");

    record_exchange(&mut app, "What is bail?", "Bail is...");
    let listing = notice(process_input(&mut app, "/history"));
    assert!(listing.contains("1. What is bail?"));

    assert_eq!(process_input(&mut app, "/load 1"), CommandResult::Continue);
    assert_eq!(app.session().view().entries().len(), 2);
    assert!(notice(process_input(&mut app, "/load 2")).contains("no exchange 2"));
}

#[test]
fn whoami_reports_anonymous_user() {
    let mut app = test_app();
    assert!(notice(process_input(&mut app, "/whoami")).starts_with("Not signed in"));
}
