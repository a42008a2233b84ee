//! CLI command implementations

pub mod demo;
pub mod expense;
pub mod export;
pub mod group;
pub mod import;
pub mod logs;
pub mod member;
pub mod report;
pub mod status;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use dvvy_core::services::{EntryPoint, LogEvent, LoggingService};
use dvvy_core::{DvvyContext, Group};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let dvvy_dir = get_dvvy_dir().ok()?;
    std::fs::create_dir_all(&dvvy_dir).ok()?;
    LoggingService::new(&dvvy_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the dvvy directory from `DVVY_DIR` or default to `~/.dvvy`
pub fn get_dvvy_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("DVVY_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".dvvy"))
        .ok_or_else(|| anyhow!("Could not find home directory; set DVVY_DIR"))
}

/// Open the dvvy context, creating the directory on first use
pub fn get_context() -> Result<DvvyContext> {
    let dvvy_dir = get_dvvy_dir()?;

    std::fs::create_dir_all(&dvvy_dir)
        .with_context(|| format!("Failed to create dvvy directory: {:?}", dvvy_dir))?;

    DvvyContext::new(&dvvy_dir).context("Failed to initialize dvvy context")
}

/// Open the context and look up a group by id or name
pub fn load_group(group: &str) -> Result<(DvvyContext, Group)> {
    let ctx = get_context()?;
    let group = ctx.group_service.find_group(group)?;
    Ok((ctx, group))
}
