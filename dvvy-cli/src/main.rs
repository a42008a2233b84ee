//! dvvy CLI - split group expenses in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod output;

use commands::{demo, expense, export, group, import, logs, member, report, status};
use dvvy_core::services::{ExportReport, LogEvent};

/// dvvy - split group expenses and settle up with the fewest payments
#[derive(Parser)]
#[command(name = "dvvy", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show totals across all groups
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create, list, show and delete groups
    Group {
        #[command(subcommand)]
        command: group::GroupCommands,
    },

    /// Manage group members
    Member {
        #[command(subcommand)]
        command: member::MemberCommands,
    },

    /// Record and manage expenses
    Expense {
        #[command(subcommand)]
        command: expense::ExpenseCommands,
    },

    /// Show each member's net balance
    Balances {
        /// Group id or name
        group: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the payments that settle the group
    Settle {
        /// Group id or name
        group: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show who owes whom, member by member
    Tabs {
        /// Group id or name
        group: String,
        /// Only this member's tabs (name or id)
        #[arg(long, short)]
        member: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show spending statistics
    Stats {
        /// Group id or name
        group: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export CSV reports
    Export {
        /// Group id or name
        group: String,
        /// Single report (balances, settlements, expenses, tabs); all when omitted
        #[arg(long, short)]
        report: Option<ExportReport>,
        /// Write the single report to this file instead of stdout
        #[arg(long, short, requires = "report")]
        output: Option<PathBuf>,
        /// Directory for the full export
        #[arg(long, conflicts_with = "report")]
        dir: Option<PathBuf>,
    },

    /// Import groups from a JSON file or stdin
    Import {
        /// Path to JSON file (reads stdin when omitted)
        file: Option<PathBuf>,
        /// Replace groups that already exist
        #[arg(long)]
        replace: bool,
        /// Validate without storing anything
        #[arg(long)]
        preview: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// View and manage logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Command name as recorded in the event log
    fn name(&self) -> &'static str {
        match self {
            Commands::Status { .. } => "status",
            Commands::Group { .. } => "group",
            Commands::Member { .. } => "member",
            Commands::Expense { .. } => "expense",
            Commands::Balances { .. } => "balances",
            Commands::Settle { .. } => "settle",
            Commands::Tabs { .. } => "tabs",
            Commands::Stats { .. } => "stats",
            Commands::Export { .. } => "export",
            Commands::Import { .. } => "import",
            Commands::Demo { .. } => "demo",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.name();

    let result = run(cli);

    // Logging the logs command would pollute what it shows
    if name != "logs" {
        let logger = commands::get_logger();
        let event = match &result {
            Ok(()) => LogEvent::new("command_executed").with_command(name),
            Err(e) => LogEvent::new("command_failed")
                .with_command(name)
                .with_error(e.to_string())
                .with_error_details(format!("{:?}", e)),
        };
        commands::log_event(&logger, event);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { json } => status::run(json),
        Commands::Group { command } => group::run(command),
        Commands::Member { command } => member::run(command),
        Commands::Expense { command } => expense::run(command),
        Commands::Balances { group, json } => report::run_balances(&group, json),
        Commands::Settle { group, json } => report::run_settle(&group, json),
        Commands::Tabs { group, member, json } => report::run_tabs(&group, member.as_deref(), json),
        Commands::Stats { group, json } => report::run_stats(&group, json),
        Commands::Export {
            group,
            report,
            output,
            dir,
        } => export::run(&group, report, output.as_deref(), dir.as_deref()),
        Commands::Import {
            file,
            replace,
            preview,
            json,
        } => import::run(file.as_deref(), replace, preview, json),
        Commands::Demo { command } => demo::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
