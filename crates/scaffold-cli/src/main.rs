//! # Scaffold CLI
//!
//! Monorepo project scaffolding: generator registry, project manifest,
//! task runner and template vendoring.
//!
//! ## Startup sequence
//!
//! 1. Parse CLI arguments (clap handles `--help` / `--version` early-exit).
//! 2. Initialise the tracing subscriber (logging).
//! 3. Locate the repository root and load configuration.
//! 4. Build the [`OutputManager`].
//! 5. Dispatch to the appropriate command handler.
//! 6. Translate any [`CliError`] into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                          |
//! |------|----------------------------------|
//! |  0   | Success                          |
//! |  1   | Internal / external tool failure |
//! |  2   | User / input error               |
//! |  3   | Resource not found               |
//! |  4   | Configuration error              |
//!
//! `scaffold run` exits with the task's own exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, Commands, GlobalArgs},
    config::{AppConfig, discover_repo_root},
    context::AppContext,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod context;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    // Load .env before anything else, including tracing init.
    let _ = dotenvy::dotenv();

    // ── 1. Parse arguments ────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help / --version land here too and must exit 0.
            let code = if e.use_stderr() { 2 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    // ── 2. Initialise tracing ─────────────────────────────────────────────
    if let Err(e) = init_logging(&cli.global) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::from(1);
    }

    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        no_color = cli.global.no_color,
        "CLI started"
    );

    let verbose = cli.global.verbose > 0;
    match start(cli) {
        Ok(()) => {
            info!("scaffold completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, verbose),
    }
}

/// Steps 3 to 5.
fn start(cli: Cli) -> CliResult<()> {
    let root = resolve_repo_root(&cli.global)?;
    debug!(root = %root.display(), "Repository root resolved");

    let config = AppConfig::load(cli.global.config.as_ref(), &root).map_err(|e| {
        CliError::ConfigError {
            message: format!("{e:#}"),
            source: Some(e.into()),
        }
    })?;

    let output = OutputManager::new(&cli.global, &config);
    let ctx = AppContext::new(root, config);
    run(cli.command, ctx, output)
}

/// Dispatch to the correct command handler.
#[instrument(skip_all)]
fn run(command: Commands, ctx: AppContext, output: OutputManager) -> CliResult<()> {
    match command {
        Commands::Add(args) => commands::add::execute(args, &ctx, &output),
        Commands::Run(args) => commands::run::execute(args, &ctx, &output),
        Commands::Doctor => commands::doctor::execute(&ctx, &output),
        Commands::Vendor(cmd) => commands::vendor::execute(cmd, &ctx, &output),
        Commands::List(args) => commands::list::execute(args, &ctx, &output),
        Commands::Matrix => commands::matrix::execute(&ctx),
        Commands::Init(args) => commands::init::execute(args, &ctx, &output),
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::Config(cmd) => commands::config::execute(cmd, &ctx, &output),
    }
}

/// `--repo-root` (made absolute), else discovery from the working directory.
fn resolve_repo_root(global: &GlobalArgs) -> CliResult<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| CliError::IoError {
        message: "Failed to read the current directory".into(),
        source: e,
    })?;
    Ok(match &global.repo_root {
        Some(root) => cwd.join(root),
        None => discover_repo_root(&cwd),
    })
}

/// Translate a `CliError` into a user message and an appropriate exit code.
fn handle_error(err: CliError, verbose: bool) -> ExitCode {
    err.log();

    // A failing task already printed its own output.
    if !matches!(err, CliError::TaskExited { .. }) {
        let msg = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
            err.format_colored(verbose)
        } else {
            err.format_plain(verbose)
        };
        eprint!("{msg}");
    }

    ExitCode::from(err.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_version_matches_cargo() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_version(), Some(env!("CARGO_PKG_VERSION")));
    }
}
