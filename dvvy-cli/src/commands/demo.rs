//! Demo command - switch between the demo database and real data

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use dvvy_core::services::{DemoService, LogEvent};

use super::{get_dvvy_dir, get_logger, log_event};

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Enable demo mode with a freshly seeded trip group
    #[command(name = "on")]
    On,
    /// Disable demo mode
    #[command(name = "off")]
    Off {
        /// Also delete the demo database
        #[arg(long)]
        clean: bool,
    },
    /// Show demo mode status
    Status,
}

pub fn run(command: Option<DemoCommands>) -> Result<()> {
    let dvvy_dir = get_dvvy_dir()?;
    std::fs::create_dir_all(&dvvy_dir)?;
    let demo_service = DemoService::new(&dvvy_dir);

    match command {
        Some(DemoCommands::On) => {
            demo_service.enable()?;
            log_event(&get_logger(), LogEvent::new("demo_enabled").with_command("demo on"));
            println!("{}", "Demo mode enabled".green());
            println!("A sample trip group has been created. Run 'dvvy settle \"Goa Trip\"' to see it.");
            Ok(())
        }
        Some(DemoCommands::Off { clean }) => {
            demo_service.disable(clean)?;
            log_event(&get_logger(), LogEvent::new("demo_disabled").with_command("demo off"));
            println!("{}", "Demo mode disabled".yellow());
            Ok(())
        }
        Some(DemoCommands::Status) | None => {
            if demo_service.is_enabled()? {
                println!("Demo mode is {}", "ON".green());
            } else {
                println!("Demo mode is {}", "OFF".yellow());
            }
            Ok(())
        }
    }
}
