//! Diagnostic CLI for probing toolgate policy decisions.
//!
//! Lets an operator check what the library would decide for a given path
//! or command line, with the same config precedence the embedding server
//! uses: `--allow` flags override the config file's `allowedDirectories`,
//! which overrides the compiled-in default.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use toolgate::{
    utils, AllowListStore, AllowSources, BlockListStore, CommandGuard, PathSandbox, PolicyConfig,
    ValidationOutcome,
};

#[derive(Parser)]
#[command(name = "toolgate", about = "Probe filesystem and command gating decisions")]
struct Cli {
    /// Policy config file (falls back to TOOLGATE_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Allowed directory (repeatable; overrides the config file list)
    #[arg(long = "allow", global = true)]
    allow: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a path against the allowed directories
    Path { path: String },
    /// Gate a command line and show the commands it would invoke
    Cmd { command_line: String },
    /// Print the default block list
    Blocklist,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging before anything else
    utils::logger::init_logging();

    let cli = Cli::parse();
    let config = PolicyConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Path { path } => {
            let store = AllowListStore::new(AllowSources {
                explicit: cli.allow,
                config_file: config.allowed_directories.clone(),
            })?;
            let sandbox = PathSandbox::with_budget(store, config.validation_timeout());

            match sandbox.validate(&path).await {
                ValidationOutcome::Resolved(resolved) => {
                    println!("allowed: {}", resolved.display());
                    Ok(ExitCode::SUCCESS)
                }
                ValidationOutcome::AccessDenied(requested) => {
                    println!(
                        "denied: {} is outside the allowed directories",
                        requested.display()
                    );
                    Ok(ExitCode::FAILURE)
                }
                ValidationOutcome::TimedOut { requested, budget } => {
                    println!(
                        "timed out after {budget:?} while validating {}",
                        requested.display()
                    );
                    Ok(ExitCode::from(2))
                }
            }
        }
        Command::Cmd { command_line } => {
            let guard = CommandGuard::new(BlockListStore::new());
            let decomposition = guard.decompose(&command_line);

            let invoked: Vec<&str> = decomposition.commands.iter().map(String::as_str).collect();
            println!("invokes: {}", invoked.join(", "));
            if decomposition.degraded {
                println!("note: decomposition degraded to coarse extraction");
            }
            let flagged = guard.blocked_in(&command_line);
            if !flagged.is_empty() {
                let names: Vec<&str> = flagged.iter().map(String::as_str).collect();
                println!("blocked commands present: {}", names.join(", "));
            }

            if guard.is_allowed(&command_line) {
                println!("gate: allowed");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("gate: denied (leading command is blocked)");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Blocklist => {
            let guard = CommandGuard::new(BlockListStore::new());
            for name in guard.blocked() {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
