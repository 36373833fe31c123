//! Show the origin revision a workflow would migrate.

use serde::Serialize;

use crate::commands::{load_workflow, CommandContext, CommandOutcome, FerryCommand, WorkflowArgs};
use crate::config::{DestinationConfig, OriginConfig};
use crate::error::Result;
use crate::loader::ConfigLoader;
use crate::origin::origin_for;
use crate::revision::{format_label, RevisionInfo};

/// Report produced by the info command.
#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub config_location: String,
    pub workflow: String,
    pub origin: OriginConfig,
    pub destination: DestinationConfig,
    /// Revision the origin's configured reference currently resolves to.
    pub revision: RevisionInfo,
    /// Provenance line a migration of that revision would carry.
    pub provenance: String,
}

/// `info config_path [workflow_name]`
#[derive(Debug, Default)]
pub struct InfoCmd;

impl FerryCommand for InfoCmd {
    fn name(&self) -> &'static str {
        "info"
    }

    fn execute(&self, args: &[String], ctx: &mut CommandContext) -> Result<CommandOutcome> {
        let args = WorkflowArgs::parse(self.name(), args, 2)?;
        let loader = ConfigLoader::for_path(&args.config_path);
        let (config, workflow) = load_workflow(&args, &loader, ctx)?;

        let origin = origin_for(&workflow.origin, args.base_dir());
        let revision = origin.resolve(None)?;

        Ok(CommandOutcome::Info(InfoReport {
            config_location: config.location,
            workflow: workflow.name,
            origin: workflow.origin,
            destination: workflow.destination,
            revision: RevisionInfo::capture(revision.as_ref())?,
            provenance: format_label(revision.as_ref()),
        }))
    }
}
