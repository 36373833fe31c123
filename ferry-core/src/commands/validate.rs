//! Check that a configuration parses and validates.

use serde::Serialize;

use crate::commands::{CommandContext, CommandOutcome, FerryCommand, WorkflowArgs};
use crate::config::{RepoKind, WorkflowMode};
use crate::error::Result;
use crate::loader::ConfigLoader;

/// Short description of one validated workflow.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSummary {
    pub name: String,
    pub mode: WorkflowMode,
    pub origin_kind: RepoKind,
    pub origin_url: String,
    pub destination_url: String,
}

/// Report produced by the validate command.
#[derive(Debug, Serialize)]
pub struct ValidateReport {
    /// Location of the validated configuration.
    pub location: String,
    pub workflows: Vec<WorkflowSummary>,
}

/// `validate config_path`
#[derive(Debug, Default)]
pub struct ValidateCmd;

impl FerryCommand for ValidateCmd {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn execute(&self, args: &[String], ctx: &mut CommandContext) -> Result<CommandOutcome> {
        let args = WorkflowArgs::parse(self.name(), args, 1)?;
        let loader = ConfigLoader::for_path(&args.config_path);
        let config = loader.load(&ctx.options, ctx.console.as_mut())?;

        let workflows = config
            .workflows
            .values()
            .map(|w| WorkflowSummary {
                name: w.name.clone(),
                mode: w.mode,
                origin_kind: w.origin.kind,
                origin_url: w.origin.url.clone(),
                destination_url: w.destination.url.clone(),
            })
            .collect();

        Ok(CommandOutcome::Validate(ValidateReport {
            location: config.location,
            workflows,
        }))
    }
}
