//! CLI entry point for the ferry source-migration tool.
//! Resolves the positional tokens to a subcommand, picks the working
//! directory, and maps error types to exit codes.

mod output;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

use ferry_core::commands::migrate::ReportingRunner;
use ferry_core::commands::{CommandContext, CommandOutcome, GeneralOptions};
use ferry_core::config::Options;
use ferry_core::error::FerryError;
use ferry_core::resolver::CommandRegistry;
use ferry_core::workdir::{resolve_workdir, SystemTempDirFactory};

/// Top-level CLI definition. Subcommands are resolved from the positional
/// tokens rather than by clap, so a bare config path runs `migrate`.
#[derive(Parser)]
#[command(
    name = "ferry",
    about = "Move code between repositories",
    version,
    override_usage = "ferry [OPTIONS] [SUBCOMMAND] <CONFIG_PATH> [WORKFLOW [SOURCE_REF]]",
    after_help = "Subcommands: migrate (default), validate, info"
)]
struct Cli {
    /// Subcommand followed by its arguments
    #[arg(value_name = "ARGS")]
    positional: Vec<String>,

    /// Working directory for staging (default: a fresh temporary directory)
    #[arg(long = "work-dir", value_name = "PATH")]
    work_dir: Option<PathBuf>,

    /// Load the configuration as it was at the migrated source revision
    #[arg(long)]
    read_config_from_revision: bool,

    /// Origin URL (overrides config)
    #[arg(long, value_name = "URL")]
    origin_url: Option<String>,

    /// Origin reference (overrides config)
    #[arg(long, value_name = "REF")]
    origin_ref: Option<String>,

    /// Destination URL (overrides config)
    #[arg(long, value_name = "URL")]
    destination_url: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose/debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging (suppress when JSON output is requested)
    let filter = if cli.json {
        "error"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    env_logger::Builder::new()
        .parse_env(env_logger::Env::default().default_filter_or(filter))
        .format_target(false)
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        print_error(&e);
        process::exit(exit_code(&e));
    }
}

/// Map error types to differentiated exit codes.
fn exit_code(error: &FerryError) -> i32 {
    match error {
        FerryError::InvalidCommand { .. } => 2,
        FerryError::ConfigError(_) => 2,
        FerryError::ValidationError(_) => 3,
        FerryError::IoError(_) => 4,
        FerryError::RepoAccessError(_) => 5,
        FerryError::UnsupportedOperation(_) => 70,
    }
}

/// Resolve the subcommand, prepare the working directory, and run it.
fn run(cli: Cli) -> Result<(), FerryError> {
    let registry = CommandRegistry::standard();
    let (command, args) = registry.resolve(&cli.positional)?.into_parts();
    log::debug!("Running '{}' with {} argument(s)", command.name(), args.len());

    let mut console = output::TerminalConsole::new(std::io::stderr());
    // Held until the command finishes; a temporary workdir is removed on drop.
    let workdir = resolve_workdir(
        cli.work_dir.as_deref(),
        &SystemTempDirFactory::new(),
        &mut console,
    )?;

    let mut ctx = CommandContext {
        options: Options {
            origin_url: cli.origin_url,
            origin_ref: cli.origin_ref,
            destination_url: cli.destination_url,
        },
        general: GeneralOptions {
            workdir: workdir.path().to_path_buf(),
            read_config_from_revision: cli.read_config_from_revision,
        },
        console: Box::new(console),
        runner: Box::new(ReportingRunner),
    };

    let outcome = command.execute(&args, &mut ctx)?;
    if cli.json {
        output::print_json(&outcome)?;
        return Ok(());
    }
    match &outcome {
        CommandOutcome::Migrate(report) => output::print_migrate_report(report),
        CommandOutcome::Validate(report) => output::print_validate_report(report),
        CommandOutcome::Info(report) => output::print_info_report(report),
    }
    Ok(())
}

/// Print a formatted error message with actionable hints to stderr.
fn print_error(error: &FerryError) {
    eprintln!("{} {}", "ERROR:".red().bold(), error);

    match error {
        FerryError::InvalidCommand { .. } => {
            eprintln!(
                "{}",
                "Hint: Pass a config path ending in ferry.toml, or prefix it with a subcommand."
                    .dimmed()
            );
        }
        FerryError::ConfigError(_) => {
            eprintln!(
                "{}",
                "Hint: Usage is 'ferry [subcommand] config_path [workflow_name [source_ref]]'."
                    .dimmed()
            );
        }
        FerryError::ValidationError(_) => {
            eprintln!(
                "{}",
                "Hint: Run 'ferry validate <config_path>' after fixing the configuration."
                    .dimmed()
            );
        }
        FerryError::RepoAccessError(_) => {
            eprintln!(
                "{}",
                "Hint: Check that git is installed and the origin URL and reference exist."
                    .dimmed()
            );
        }
        FerryError::UnsupportedOperation(_) => {
            eprintln!(
                "{}",
                "Hint: Drop --read-config-from-revision or keep the config inside the origin repository."
                    .dimmed()
            );
        }
        FerryError::IoError(_) => {}
    }
}
