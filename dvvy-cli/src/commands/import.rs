//! Import command - load groups from a JSON export

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use comfy_table::Cell;

use dvvy_core::services::{ImportOptions, LogEvent};

use super::{get_context, get_logger, log_event};
use crate::output;

/// Read the payload from `file`, or from stdin when data is piped in
fn read_payload(file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        return Ok(input);
    }

    bail!("No input. Pass a JSON file or pipe one in: dvvy import < groups.json")
}

pub fn run(file: Option<&Path>, replace: bool, preview: bool, json: bool) -> Result<()> {
    let payload = read_payload(file)?;
    let ctx = get_context()?;

    let options = ImportOptions {
        replace,
        preview_only: preview,
    };
    let result = ctx.import_service.import(&payload, &options)?;

    if !result.preview {
        let logger = get_logger();
        for group in &result.groups {
            log_event(
                &logger,
                LogEvent::new("group_imported").with_group(&group.id).with_command("import"),
            );
        }
    }

    if json {
        return output::json(&result);
    }

    if result.preview {
        println!("{}", "PREVIEW MODE - No changes applied".yellow());
        println!();
    }

    let mut table = output::create_table();
    table.set_header(vec!["Group", "Members", "Expenses", "ID"]);
    for group in &result.groups {
        table.add_row(vec![
            Cell::new(&group.name),
            Cell::new(group.members),
            Cell::new(group.expenses),
            Cell::new(&group.id),
        ]);
    }
    println!("{}", table);

    if !result.preview {
        output::success(&format!("Imported {} groups", result.groups.len()));
        if result.replaced > 0 {
            output::info(&format!("Replaced {} existing groups", result.replaced));
        }
    }
    Ok(())
}
