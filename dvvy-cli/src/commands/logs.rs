//! Logs command - view and manage the local event log

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use dialoguer::Confirm;

use dvvy_core::services::logging::now_ms;
use dvvy_core::services::{EntryPoint, LoggingService};

use super::get_dvvy_dir;
use crate::output;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only errors
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear old log entries
    Clear {
        /// Delete logs older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show log statistics and database path
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn get_logging_service() -> Result<LoggingService> {
    let dvvy_dir = get_dvvy_dir()?;
    std::fs::create_dir_all(&dvvy_dir)?;
    LoggingService::new(&dvvy_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    use chrono::{TimeZone, Utc};
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<()> {
    let service = get_logging_service()?;

    match command {
        LogsCommands::List { limit, errors, json } => {
            let entries = if errors {
                service.get_errors(limit)?
            } else {
                service.get_recent(limit)?
            };

            if json {
                return output::json(&entries);
            }

            if entries.is_empty() {
                output::info("No log entries found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Time", "Event", "Command", "Group", "Error"]);
            for entry in &entries {
                let error = if entry.error_message.is_some() {
                    "!".red().to_string()
                } else {
                    String::new()
                };
                table.add_row(vec![
                    Cell::new(format_timestamp(entry.timestamp)),
                    Cell::new(&entry.event),
                    Cell::new(entry.command.as_deref().unwrap_or("")),
                    Cell::new(entry.group_id.as_deref().unwrap_or("")),
                    Cell::new(error),
                ]);
            }
            println!("{}", table);

            if !errors {
                let recent_errors = service.get_errors(3)?;
                if !recent_errors.is_empty() {
                    println!();
                    println!("{}", "Recent errors:".red().bold());
                    for err in &recent_errors {
                        println!(
                            "  {} [{}]: {}",
                            format_timestamp(err.timestamp).dimmed(),
                            err.event,
                            err.error_message.as_deref().unwrap_or("unknown error")
                        );
                    }
                }
            }
        }
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => {
            let cutoff_ms = now_ms() - older_than_days as i64 * DAY_MS;

            if !force && !json {
                if !Confirm::new()
                    .with_prompt(format!("Delete logs older than {} days?", older_than_days))
                    .default(false)
                    .interact()?
                {
                    output::info("Cancelled");
                    return Ok(());
                }
            }

            let deleted = service.delete_before(cutoff_ms)?;
            if json {
                return output::json(&serde_json::json!({ "deleted": deleted }));
            }
            output::success(&format!("Deleted {} log entries", deleted));
        }
        LogsCommands::Stats { json } => {
            let total = service.count()?;
            let errors = service.count_errors()?;
            let db_path = service.db_path().to_path_buf();
            let size_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

            if json {
                return output::json(&serde_json::json!({
                    "total_entries": total,
                    "error_count": errors,
                    "database_path": db_path.to_string_lossy(),
                    "database_size_bytes": size_bytes,
                }));
            }

            println!("{}", "Log statistics".bold());
            println!("  Total entries: {}", total);
            println!("  Errors: {}", errors);
            println!("  Database: {}", db_path.display());
            println!("  Size: {} bytes", size_bytes);
        }
    }

    Ok(())
}
