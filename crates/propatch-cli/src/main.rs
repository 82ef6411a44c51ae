// propatch — command-line entry point.
//
//   propatch [patch]          flip additional.proStatus to "pro"
//   propatch status [--json]  show the stored proStatus, read-only
//   propatch completions SH   print shell completions

mod console;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use console::ConsoleNotifier;
use propatch::{
    default_store_path, DefaultStoreLocator, FixedPathLocator, LocatorConfig, Notifier,
    PatchResult, ProStatus, SettingsPatcher, Store, StoreLocator, TerminalPrompt,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "propatch", version, about = "Set Cold Turkey Blocker's proStatus to pro")]
struct Cli {
    /// Database file to patch; skips default discovery and the prompt.
    #[arg(long, env = "PROPATCH_DB", global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Fail instead of prompting when the default database is missing.
    #[arg(long, global = true)]
    no_prompt: bool,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Transition proStatus to "pro" (default).
    Patch,
    /// Print the stored proStatus without writing.
    Status {
        /// Emit a JSON object instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Print shell completions to stdout.
    Completions { shell: Shell },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn build_locator(cli: &Cli) -> Box<dyn StoreLocator> {
    match &cli.db {
        Some(path) => Box::new(FixedPathLocator(path.clone())),
        None => {
            let config = LocatorConfig {
                default_path: default_store_path(),
                interactive: !cli.no_prompt,
            };
            Box::new(DefaultStoreLocator::new(config, TerminalPrompt::stdio()))
        }
    }
}

fn status(locator: &dyn StoreLocator, json: bool) -> PatchResult<()> {
    let path = locator.locate()?;
    let store = Store::open(&path)?;
    let current: ProStatus = SettingsPatcher::new(ConsoleNotifier).inspect(&store)?;

    if json {
        let out = serde_json::json!({ "path": store.path().display().to_string(), "proStatus": current });
        println!("{}", out);
    } else {
        println!("{}: {}", store.path().display(), current);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.clone().unwrap_or(Command::Patch);
    match command {
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "propatch", &mut io::stdout());
            ExitCode::SUCCESS
        }
        Command::Patch => {
            let locator = build_locator(&cli);
            match SettingsPatcher::new(ConsoleNotifier).run(locator.as_ref()) {
                Ok(_) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
        Command::Status { json } => {
            let locator = build_locator(&cli);
            match status(locator.as_ref(), json) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    ConsoleNotifier.error(&e.operator_message());
                    ExitCode::FAILURE
                }
            }
        }
    }
}
