//! Terminal output formatting for the ferry subcommands.
//! Uses comfy-table for tabular output and colored for
//! status-aware terminal styling.

use std::io::Write;

use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde::Serialize;

use ferry_core::commands::{InfoReport, MigrateReport, ValidateReport};
use ferry_core::console::Console;
use ferry_core::error::FerryError;
use ferry_core::revision::RevisionInfo;

/// Console for interactive runs. Progress goes through the log filter;
/// warnings and errors are always written to `out` (stderr in the binary),
/// so `--quiet` and `--json` cannot hide them.
pub struct TerminalConsole<W: Write> {
    out: W,
}

impl<W: Write> TerminalConsole<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Console for TerminalConsole<W> {
    fn info(&mut self, message: &str) {
        log::info!("{}", message);
    }

    fn warn(&mut self, message: &str) {
        let _ = writeln!(self.out, "{} {}", "WARNING:".yellow().bold(), message);
    }

    fn error(&mut self, message: &str) {
        let _ = writeln!(self.out, "{} {}", "ERROR:".red().bold(), message);
    }
}

/// Print any report as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), FerryError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| FerryError::IoError(e.into()))?;
    println!("{}", json);
    Ok(())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.into_iter().map(Cell::new).collect::<Vec<_>>());
    table
}

/// Key/value table describing a revision.
fn revision_table(revision: &RevisionInfo) -> Table {
    let mut table = new_table(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Revision"), Cell::new(&revision.revision)]);
    if let Some(reference) = &revision.context_reference {
        table.add_row(vec![Cell::new("Reference"), Cell::new(reference)]);
    }
    let timestamp = revision
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S %:z").to_string())
        .unwrap_or_else(|| "-".to_string());
    table.add_row(vec![Cell::new("Timestamp"), Cell::new(&timestamp)]);
    for (name, value) in &revision.labels {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    table
}

/// Print the plan a migrate run handed to the runner.
pub fn print_migrate_report(report: &MigrateReport) {
    let plan = &report.plan;
    println!(
        "{}",
        format!(
            "Workflow '{}' ({}) migrated from {}",
            plan.workflow.name, plan.workflow.mode, plan.workflow.origin.url
        )
        .green()
        .bold()
    );
    println!("  {} {}", "Destination:".dimmed(), plan.workflow.destination.url);
    println!("  {} {}", "Config:".dimmed(), plan.config_location);
    if plan.config_from_revision {
        println!("  {}", "Config read at the source revision".cyan());
    }
    println!("  {} {}", "Workdir:".dimmed(), plan.workdir.display());
    println!("{}", revision_table(&plan.revision));
    println!("{}", plan.provenance.dimmed());
}

/// Print the workflows of a validated configuration.
pub fn print_validate_report(report: &ValidateReport) {
    println!(
        "{}",
        format!(
            "{} is valid ({} workflow(s))",
            report.location,
            report.workflows.len()
        )
        .green()
        .bold()
    );

    let mut table = new_table(vec!["Workflow", "Mode", "Origin", "Destination"]);
    for w in &report.workflows {
        table.add_row(vec![
            Cell::new(&w.name),
            Cell::new(w.mode.to_string()),
            Cell::new(format!("{} ({})", w.origin_url, w.origin_kind)),
            Cell::new(&w.destination_url),
        ]);
    }
    println!("{table}");
}

/// Print the revision a workflow's origin currently resolves to.
pub fn print_info_report(report: &InfoReport) {
    println!(
        "{} {}",
        "Workflow:".bold(),
        report.workflow.cyan().bold()
    );
    println!("  {} {}", "Config:".dimmed(), report.config_location);
    println!(
        "  {} {} @ {}",
        "Origin:".dimmed(),
        report.origin.url,
        report.origin.reference
    );
    println!(
        "  {} {} ({})",
        "Destination:".dimmed(),
        report.destination.url,
        report.destination.push
    );
    println!("{}", revision_table(&report.revision));
    println!("{}", report.provenance.dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_console_always_writes_warnings() {
        let mut console = TerminalConsole::new(Vec::new());
        console.info("progress");
        console.warn("/tmp/stage is not empty");
        console.error("boom");
        let written = String::from_utf8(console.out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("WARNING:"));
        assert!(lines[0].ends_with("/tmp/stage is not empty"));
        assert!(lines[1].contains("ERROR:"));
    }
}
