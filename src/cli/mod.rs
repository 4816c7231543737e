//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and dispatches to the chat loop
//! or one of the non-interactive commands.

pub mod say;
pub mod settings;

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::client::{ClientContext, Overrides};
use crate::core::config::Config;
use crate::core::history::{ClearOutcome, Confirmation, HistoryController};
use crate::core::identity::IdentityProvider;
use crate::core::session::ChatSession;
use crate::core::settings::SettingsStore;
use crate::core::view::NullView;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::{self, LogTarget};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "guardian")]
#[command(version = VERSION)]
#[command(about = "Terminal chat client for the Guardian legal assistant")]
#[command(
    long_about = "Guardian answers questions about Indian law. This client talks to a Guardian \
chat service, keeps your preferences in local storage and picks up the identity written by \
the Guardian sign-in flow.\n\n\
Controls:\n\
  Enter             Send the message\n\
  \\ at line end     Continue the message on the next line\n\
  /help             List chat commands\n\
  Ctrl+D            Leave the chat\n\n\
Environment Variables:\n\
  GUARDIAN_LOG      Log filter directives (default: warn)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Root URL of the chat service (overrides the configured base-url)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Cookie header holding the signed-in identity (overrides cookie-file)
    #[arg(long, global = true, value_name = "COOKIES")]
    pub cookie: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Ask a single question and print the answer
    Say {
        /// The question to ask
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Show or change chat settings (theme, speed, api-key, disclaimer)
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Show the identity the chat will use
    Whoami,
    /// Delete all session history on the server
    ClearHistory {
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the saved settings
    Show,
    /// Change one setting and save it
    Set { key: String, value: String },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };

    let command = args.command.unwrap_or(Commands::Chat);
    let interactive = matches!(command, Commands::Chat);
    let log_file = args.log.or_else(|| config.log_file.clone());
    if let Err(err) = logging::init(LogTarget::choose(log_file.as_deref(), interactive)) {
        eprintln!("⚠️  Logging disabled: {err}");
    }

    let ctx = ClientContext::new(
        config,
        Overrides {
            base_url: args.base_url,
            cookie: args.cookie,
        },
    );

    match command {
        Commands::Chat => run_chat(&ctx).await,
        Commands::Say { prompt } => say::run_say(&ctx, prompt).await,
        Commands::Settings { command } => {
            let result = match command.unwrap_or(SettingsCommands::Show) {
                SettingsCommands::Show => settings::show_settings(&ctx),
                SettingsCommands::Set { key, value } => settings::set_setting(&ctx, &key, &value),
            };
            exit_on_error(result)
        }
        Commands::Whoami => whoami(&ctx),
        Commands::ClearHistory { yes } => clear_history(&ctx, yes).await,
        Commands::Set { key, value } => {
            let mut config = ctx.config().clone();
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            let value = value.join(" ");
            if let Err(err) = config.set_value(&key, &value) {
                eprintln!("❌ {err}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Set {key} to: {value}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = ctx.config().clone();
            if let Err(err) = config.unset_value(&key) {
                eprintln!("❌ {err}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
    }
}

fn exit_on_error(result: Result<(), Box<dyn Error>>) -> Result<(), Box<dyn Error>> {
    if let Err(err) = result {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
    Ok(())
}

fn whoami(ctx: &ClientContext) -> Result<(), Box<dyn Error>> {
    match ctx.identity()?.resolve() {
        Some(identity) => {
            println!("{} [{}]", identity.name, identity.initials());
            println!("  id: {}", identity.id);
            if !identity.role.is_empty() {
                println!("  role: {}", identity.role);
            }
        }
        None => println!("Not signed in (messages are labelled U)"),
    }
    Ok(())
}

async fn clear_history(ctx: &ClientContext, yes: bool) -> Result<(), Box<dyn Error>> {
    let confirmation = if yes {
        Confirmation::Granted
    } else {
        print!("Clear all session history? [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Confirmation::from_answer(&answer)
    };

    let settings = SettingsStore::load(ctx.local_store()?).current().clone();
    let mut session = ChatSession::new(NullView, settings);
    let outcome = HistoryController::new(&mut session)
        .clear_history(confirmation, &ctx.transport())
        .await;

    match outcome {
        ClearOutcome::Declined => println!("Nothing was cleared."),
        ClearOutcome::Purged => println!("✅ Session history cleared"),
        ClearOutcome::PurgeFailed => {
            eprintln!("⚠️  The service did not confirm the purge; see the log for details")
        }
    }
    Ok(())
}
