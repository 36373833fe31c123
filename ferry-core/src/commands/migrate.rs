//! Resolve a workflow and its source revision, then hand the plan to the runner.

use std::path::PathBuf;

use serde::Serialize;

use crate::commands::{
    load_workflow, CommandContext, CommandOutcome, FerryCommand, WorkflowArgs, WorkflowRunner,
};
use crate::config::Workflow;
use crate::console::Console;
use crate::error::{FerryError, Result};
use crate::loader::ConfigLoader;
use crate::origin::origin_for;
use crate::revision::{format_label, RevisionInfo};

/// Everything the migration engine needs for one run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationPlan {
    /// Where the effective configuration was read from.
    pub config_location: String,
    pub workflow: Workflow,
    /// Source revision being migrated.
    pub revision: RevisionInfo,
    /// Provenance line for destination commit messages.
    pub provenance: String,
    /// Staging directory.
    pub workdir: PathBuf,
    /// Whether the config was reloaded at `revision`.
    pub config_from_revision: bool,
}

/// Report produced by the migrate command.
#[derive(Debug, Serialize)]
pub struct MigrateReport {
    pub plan: MigrationPlan,
}

/// Runner that only reports the plan through the console.
#[derive(Debug, Default)]
pub struct ReportingRunner;

impl WorkflowRunner for ReportingRunner {
    fn run(&self, plan: &MigrationPlan, console: &mut dyn Console) -> Result<()> {
        console.info(&format!(
            "Migrating workflow '{}' ({}) from {} to {}",
            plan.workflow.name,
            plan.workflow.mode,
            plan.workflow.origin.url,
            plan.workflow.destination.url
        ));
        console.info(&format!("Stamping destination with '{}'", plan.provenance));
        Ok(())
    }
}

/// `migrate config_path [workflow_name [source_ref]]`, the default command.
#[derive(Debug, Default)]
pub struct MigrateCmd;

impl FerryCommand for MigrateCmd {
    fn name(&self) -> &'static str {
        "migrate"
    }

    fn execute(&self, args: &[String], ctx: &mut CommandContext) -> Result<CommandOutcome> {
        let args = WorkflowArgs::parse(self.name(), args, 3)?;
        let from_revision = ctx.general.read_config_from_revision;
        let mut loader = ConfigLoader::for_path(&args.config_path);
        let (mut config, mut workflow) = load_workflow(&args, &loader, ctx)?;

        let origin = origin_for(&workflow.origin, args.base_dir());
        let revision = origin.resolve(args.source_ref.as_deref())?;
        ctx.console.info(&format!(
            "Resolved '{}' to {}",
            args.source_ref
                .as_deref()
                .unwrap_or(workflow.origin.reference.as_str()),
            revision.as_string()
        ));

        if from_revision {
            if let Some(source) = origin.revision_config_source(&args.config_path) {
                loader = loader.with_revision_source(source);
            }
            if !loader.supports_load_for_revision() {
                return Err(FerryError::UnsupportedOperation(format!(
                    "Config {} cannot be loaded at a specific revision: its history is not \
                     part of the {} origin of workflow '{}'",
                    loader.location(),
                    workflow.origin.kind,
                    workflow.name
                )));
            }
            config =
                loader.load_for_revision(&ctx.options, ctx.console.as_mut(), revision.as_ref())?;
            workflow = config.workflow(&args.workflow)?.clone();
        }

        let plan = MigrationPlan {
            config_location: config.location.clone(),
            workflow,
            revision: RevisionInfo::capture(revision.as_ref())?,
            provenance: format_label(revision.as_ref()),
            workdir: ctx.general.workdir.clone(),
            config_from_revision: from_revision,
        };
        log::debug!(
            "Running workflow {}; revision={}, workdir={}",
            plan.workflow.name,
            plan.revision.revision,
            plan.workdir.display()
        );
        ctx.runner.run(&plan, ctx.console.as_mut())?;
        Ok(CommandOutcome::Migrate(MigrateReport { plan }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::GeneralOptions;
    use crate::config::Options;
    use crate::console::RecordingConsole;

    fn context(workdir: PathBuf) -> CommandContext {
        CommandContext {
            options: Options::default(),
            general: GeneralOptions {
                workdir,
                read_config_from_revision: false,
            },
            console: Box::new(RecordingConsole::new()),
            runner: Box::new(ReportingRunner),
        }
    }

    fn write_config(dir: &std::path::Path) -> PathBuf {
        std::fs::create_dir_all(dir.join("src")).unwrap();
        let path = dir.join("ferry.toml");
        std::fs::write(
            &path,
            r#"
[[workflow]]
name = "default"
[workflow.origin]
type = "folder"
url = "src"
[workflow.destination]
url = "https://example.com/out.git"
"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_migrate_folder_origin() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        let mut ctx = context(dir.path().join("work"));

        let outcome = MigrateCmd
            .execute(&[config_path.display().to_string()], &mut ctx)
            .unwrap();
        let CommandOutcome::Migrate(report) = outcome else {
            panic!("expected migrate report");
        };
        let src = std::fs::canonicalize(dir.path().join("src")).unwrap();
        assert_eq!(report.plan.revision.revision, src.display().to_string());
        assert_eq!(
            report.plan.provenance,
            format!("FolderOrigin-RevId: {}", src.display())
        );
        assert_eq!(report.plan.workdir, dir.path().join("work"));
        assert!(!report.plan.config_from_revision);
    }

    #[test]
    fn test_migrate_from_revision_needs_history() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        let mut ctx = context(dir.path().join("work"));
        ctx.general.read_config_from_revision = true;

        let err = MigrateCmd
            .execute(&[config_path.display().to_string()], &mut ctx)
            .unwrap_err();
        match err {
            FerryError::UnsupportedOperation(msg) => {
                assert!(msg.contains("folder origin of workflow 'default'"))
            }
            other => panic!("expected UnsupportedOperation, got {:?}", other),
        }
    }

    #[test]
    fn test_migrate_requires_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path().to_path_buf());
        let err = MigrateCmd.execute(&[], &mut ctx).unwrap_err();
        assert!(matches!(err, FerryError::ConfigError(_)));
    }

    #[test]
    fn test_migrate_unknown_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        let mut ctx = context(dir.path().to_path_buf());
        let err = MigrateCmd
            .execute(
                &[config_path.display().to_string(), "nope".to_string()],
                &mut ctx,
            )
            .unwrap_err();
        assert!(err.to_string().contains("Workflow 'nope' not found"));
    }
}
