//! Interactive chat loop.
//!
//! Reads the terminal line by line and multiplexes typed input with exchange
//! results coming back from the [`ChatService`]. A line ending in `\` works
//! like Shift+Enter: it adds a line break to the message instead of sending.

use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::api::ChatTransport;
use crate::commands::{process_input, CommandResult, PendingAction};
use crate::core::app::App;
use crate::core::chat_service::ChatService;
use crate::core::client::ClientContext;
use crate::core::history::Confirmation;
use crate::core::session::{KeyInput, KeyOutcome, PendingExchange, SessionState, SubmitOutcome};
use crate::core::storage::LocalStore;
use crate::ui::terminal::TerminalView;

const CONTINUATION: char = '\\';
const BUSY_NOTICE: &str =
    "Guardian is still answering. Your message is kept; press Enter to send it afterwards.";

#[derive(Debug)]
pub enum LineOutcome {
    Continue,
    Dispatch(PendingExchange),
    Confirm(PendingAction),
    Quit,
}

enum LoopExit {
    Quit,
    Reload,
}

pub async fn run_chat(ctx: &ClientContext) -> Result<(), Box<dyn Error>> {
    let transport: Arc<dyn ChatTransport> = Arc::new(ctx.transport());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        // A fresh channel per mount; results of abandoned exchanges go nowhere.
        let (service, mut results) = ChatService::new(Arc::clone(&transport));
        let identity = ctx.identity()?;
        let mut app = App::mount(TerminalView::stdout(), ctx.local_store()?, &identity);
        app.session_mut()
            .view_mut()
            .notice("Type /help for commands. End a line with \\ to continue it.");

        let mut awaiting: Option<PendingAction> = None;

        let exit = loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break LoopExit::Quit;
                    };
                    if let Some(action) = awaiting.take() {
                        let view = app.session_mut().view_mut();
                        view.record_input_echo(&line);
                        view.keep_input_echo();
                        let confirmation = Confirmation::from_answer(&line);
                        run_pending(&mut app, action, confirmation, service.transport()).await;
                    } else {
                        match handle_line(&mut app, &line) {
                            LineOutcome::Continue => {}
                            LineOutcome::Dispatch(pending) => service.spawn_exchange(pending),
                            LineOutcome::Confirm(action) => {
                                app.session_mut().view_mut().prompt(action.question());
                                awaiting = Some(action);
                            }
                            LineOutcome::Quit => break LoopExit::Quit,
                        }
                    }
                }
                Some(result) = results.recv() => {
                    app.session_mut().complete(result);
                }
            }

            if app.session_mut().view_mut().take_reload() {
                break LoopExit::Reload;
            }
        };

        match exit {
            LoopExit::Quit => return Ok(()),
            LoopExit::Reload => debug!("reloading chat view"),
        }
    }
}

/// Applies one typed line to the composer or runs it as a command.
pub fn handle_line<W: Write, S: LocalStore>(
    app: &mut App<TerminalView<W>, S>,
    line: &str,
) -> LineOutcome {
    app.session_mut().view_mut().record_input_echo(line);

    if let Some(continued) = line.strip_suffix(CONTINUATION) {
        type_text(app, continued);
        app.session_mut()
            .handle_key(KeyInput::Enter { shift: true });
        return LineOutcome::Continue;
    }

    if app.session().input().is_empty() && line.trim_start().starts_with('/') {
        let result = process_input(app, line);
        if !matches!(result, CommandResult::ProcessAsMessage(_)) {
            app.session_mut().view_mut().keep_input_echo();
        }
        match result {
            CommandResult::Continue => return LineOutcome::Continue,
            CommandResult::Notice(text) => {
                app.session_mut().view_mut().notice(&text);
                return LineOutcome::Continue;
            }
            CommandResult::Confirm(action) => return LineOutcome::Confirm(action),
            CommandResult::Quit => return LineOutcome::Quit,
            CommandResult::ProcessAsMessage(_) => {}
        }
    }

    type_text(app, line);
    let session = app.session_mut();
    let will_render =
        !session.input().trim().is_empty() && session.state() != SessionState::AwaitingResponse;
    if will_render {
        session.view_mut().erase_input_echo();
    }

    match session.handle_key(KeyInput::Enter { shift: false }) {
        KeyOutcome::Submit(SubmitOutcome::Dispatched(pending)) => LineOutcome::Dispatch(pending),
        KeyOutcome::Submit(SubmitOutcome::Busy) => {
            session.view_mut().notice(BUSY_NOTICE);
            LineOutcome::Continue
        }
        KeyOutcome::Submit(SubmitOutcome::Empty) | KeyOutcome::Edited => {
            session.view_mut().keep_input_echo();
            LineOutcome::Continue
        }
    }
}

fn type_text<W: Write, S: LocalStore>(app: &mut App<TerminalView<W>, S>, text: &str) {
    let session = app.session_mut();
    for c in text.chars() {
        session.handle_key(KeyInput::Char(c));
    }
}

/// Runs a confirmed (or declined) destructive action.
pub async fn run_pending<W: Write, S: LocalStore>(
    app: &mut App<TerminalView<W>, S>,
    action: PendingAction,
    confirmation: Confirmation,
    transport: &dyn ChatTransport,
) {
    match (action, confirmation) {
        (_, Confirmation::Declined) => debug!(?action, "declined"),
        (PendingAction::ResetView, Confirmation::Granted) => app.session_mut().reset(),
        (PendingAction::ClearHistory, Confirmation::Granted) => {
            app.history()
                .clear_history(Confirmation::Granted, transport)
                .await;
        }
    }
}
