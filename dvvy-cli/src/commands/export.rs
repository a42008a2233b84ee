//! Export command - CSV reports for a group

use std::path::{Path, PathBuf};

use anyhow::Result;

use dvvy_core::services::{ExportReport, ExportService, LogEvent};

use super::{get_logger, load_group, log_event};
use crate::output;

/// Export one report to a file or stdout, or every report into `dir`
pub fn run(group: &str, report: Option<ExportReport>, file: Option<&Path>, dir: Option<&Path>) -> Result<()> {
    let (_ctx, group) = load_group(group)?;

    match (report, file) {
        (Some(report), None) => {
            // Plain CSV on stdout so it can be piped
            ExportService::write_report(&group, report, std::io::stdout().lock())?;
        }
        (Some(report), Some(path)) => {
            ExportService::export_to_path(&group, report, path)?;
            output::success(&format!("Wrote {} to {}", report, path.display()));
        }
        (None, _) => {
            let dir = dir.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
            let written = ExportService::export_all(&group, &dir)?;
            output::success(&format!("Exported {} reports for {}", written.len(), group.name));
            for path in &written {
                println!("  {}", path.display());
            }
        }
    }

    log_event(
        &get_logger(),
        LogEvent::new("group_exported").with_group(&group.id).with_command("export"),
    );
    Ok(())
}
