//! Subcommand implementations: migrate, validate, info.
//!
//! Every subcommand receives the residual positional arguments
//! `config_path [workflow_name [source_ref]]` chosen by the resolver.

pub mod info;
pub mod migrate;
pub mod validate;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{Config, Options, Workflow, DEFAULT_WORKFLOW_NAME};
use crate::console::Console;
use crate::error::{FerryError, Result};
use crate::loader::ConfigLoader;

pub use info::InfoReport;
pub use migrate::{MigrateReport, MigrationPlan};
pub use validate::ValidateReport;

/// A selectable top-level operation.
pub trait FerryCommand {
    /// Lower-case name used on the command line.
    fn name(&self) -> &'static str;

    fn execute(&self, args: &[String], ctx: &mut CommandContext) -> Result<CommandOutcome>;
}

/// Executes a resolved migration plan. The transformation engine plugs in here.
pub trait WorkflowRunner {
    fn run(&self, plan: &MigrationPlan, console: &mut dyn Console) -> Result<()>;
}

/// Settings that apply to the whole invocation rather than to one workflow.
#[derive(Debug, Clone)]
pub struct GeneralOptions {
    /// Resolved staging directory.
    pub workdir: PathBuf,
    /// Reload the config as it was at the resolved source revision.
    pub read_config_from_revision: bool,
}

/// Everything a subcommand needs besides its arguments.
pub struct CommandContext {
    pub options: Options,
    pub general: GeneralOptions,
    pub console: Box<dyn Console>,
    pub runner: Box<dyn WorkflowRunner>,
}

/// Result of a subcommand, rendered by the front end.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandOutcome {
    Migrate(MigrateReport),
    Validate(ValidateReport),
    Info(InfoReport),
}

/// Positional arguments shared by the subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowArgs {
    pub config_path: PathBuf,
    pub workflow: String,
    pub source_ref: Option<String>,
}

impl WorkflowArgs {
    /// Parse `config_path [workflow_name [source_ref]]`, accepting at most `max` arguments.
    pub fn parse(command: &str, args: &[String], max: usize) -> Result<Self> {
        let usage = match max {
            1 => "config_path",
            2 => "config_path [workflow_name]",
            _ => "config_path [workflow_name [source_ref]]",
        };
        if args.is_empty() || args.len() > max {
            return Err(FerryError::ConfigError(format!(
                "'{}' expects {}, got {} argument(s). Usage: ferry {} {}",
                command,
                usage,
                args.len(),
                command,
                usage
            )));
        }
        Ok(Self {
            config_path: PathBuf::from(&args[0]),
            workflow: args
                .get(1)
                .cloned()
                .unwrap_or_else(|| DEFAULT_WORKFLOW_NAME.to_string()),
            source_ref: args.get(2).cloned(),
        })
    }

    /// Directory relative origin paths are resolved against.
    pub fn base_dir(&self) -> &Path {
        match self.config_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

/// Load the config at `args.config_path` and select the requested workflow.
pub(crate) fn load_workflow(
    args: &WorkflowArgs,
    loader: &ConfigLoader,
    ctx: &mut CommandContext,
) -> Result<(Config, Workflow)> {
    let config = loader.load(&ctx.options, ctx.console.as_mut())?;
    let workflow = config.workflow(&args.workflow)?.clone();
    Ok((config, workflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_workflow_args_defaults() {
        let parsed = WorkflowArgs::parse("migrate", &args(&["ferry.toml"]), 3).unwrap();
        assert_eq!(parsed.config_path, PathBuf::from("ferry.toml"));
        assert_eq!(parsed.workflow, "default");
        assert_eq!(parsed.source_ref, None);
        assert_eq!(parsed.base_dir(), Path::new("."));
    }

    #[test]
    fn test_workflow_args_full() {
        let parsed =
            WorkflowArgs::parse("migrate", &args(&["cfg/ferry.toml", "docs", "v1.2"]), 3).unwrap();
        assert_eq!(parsed.workflow, "docs");
        assert_eq!(parsed.source_ref.as_deref(), Some("v1.2"));
        assert_eq!(parsed.base_dir(), Path::new("cfg"));
    }

    #[test]
    fn test_workflow_args_usage_errors() {
        let err = WorkflowArgs::parse("validate", &[], 1).unwrap_err();
        assert!(matches!(err, FerryError::ConfigError(_)));
        assert!(err.to_string().contains("Usage: ferry validate config_path"));

        let err = WorkflowArgs::parse("info", &args(&["a", "b", "c"]), 2).unwrap_err();
        assert!(err.to_string().contains("got 3 argument(s)"));
    }
}
