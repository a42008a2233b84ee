//! Group command - create, list, show and delete groups

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use dialoguer::Confirm;
use rust_decimal::Decimal;

use dvvy_core::services::{LogEvent, SummaryService};

use super::{get_context, get_logger, load_group, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a group
    Create {
        /// Group name
        name: String,
        /// Member names (repeat or comma-separate)
        #[arg(short, long = "member", value_delimiter = ',', required = true)]
        members: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all groups
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a group's members and balances
    Show {
        /// Group id or name
        group: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a group with all its expenses
    Delete {
        /// Group id or name
        group: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: GroupCommands) -> Result<()> {
    match command {
        GroupCommands::Create { name, members, json } => run_create(&name, &members, json),
        GroupCommands::List { json } => run_list(json),
        GroupCommands::Show { group, json } => run_show(&group, json),
        GroupCommands::Delete { group, force } => run_delete(&group, force),
    }
}

fn run_create(name: &str, members: &[String], json: bool) -> Result<()> {
    let ctx = get_context()?;
    let group = ctx.group_service.create_group(name, members)?;
    log_event(
        &get_logger(),
        LogEvent::new("group_created").with_group(&group.id).with_command("group create"),
    );

    if json {
        return output::json(&group);
    }

    output::success(&format!("Created group '{}' ({})", group.name, group.id));
    for member in &group.members {
        println!("  • {}", member.name);
    }
    Ok(())
}

fn run_list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let groups = ctx.group_service.list_groups()?;

    if json {
        return output::json(&groups);
    }

    if groups.is_empty() {
        output::info("No groups yet. Create one with 'dvvy group create <name> -m <member>'.");
        return Ok(());
    }

    let symbol = &ctx.config.currency_symbol;
    let mut table = output::create_table();
    table.set_header(vec!["Name", "Members", "Expenses", "Total", "Created", "ID"]);
    for group in &groups {
        let total: Decimal = group.expenses.iter().map(|e| e.amount).sum();
        table.add_row(vec![
            Cell::new(&group.name),
            Cell::new(group.members.len()),
            Cell::new(group.expenses.len()),
            output::money_cell(symbol, total),
            Cell::new(group.created_at.format("%Y-%m-%d")),
            Cell::new(&group.id),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn run_show(group: &str, json: bool) -> Result<()> {
    let (ctx, group) = load_group(group)?;
    let summary = SummaryService::summarize(&group);

    if json {
        return output::json(&serde_json::json!({
            "group": group,
            "balances": summary.balances,
            "settlements": summary.settlements,
        }));
    }

    let symbol = &ctx.config.currency_symbol;
    println!("{}", group.name.bold());
    output::info(&format!(
        "{} members · {} expenses · created {}",
        group.members.len(),
        group.expenses.len(),
        group.created_at.format("%Y-%m-%d")
    ));
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Member", "Paid", "Share", "Balance", "ID"]);
    for (balance, stats) in summary.balances.iter().zip(&summary.member_stats) {
        table.add_row(vec![
            Cell::new(group.member_name(&balance.member_id)),
            output::money_cell(symbol, stats.total_paid),
            output::money_cell(symbol, stats.total_share),
            Cell::new(output::signed_money(symbol, balance.amount)),
            Cell::new(&balance.member_id),
        ]);
    }
    println!("{}", table);

    if summary.all_settled() {
        println!();
        output::success("All settled up");
    } else {
        println!();
        println!("{}", "To settle up".bold());
        for s in &summary.settlements {
            println!(
                "  {} → {}  {}",
                group.member_name(&s.from),
                group.member_name(&s.to),
                output::money(symbol, s.amount)
            );
        }
    }
    Ok(())
}

fn run_delete(group: &str, force: bool) -> Result<()> {
    let (ctx, group) = load_group(group)?;

    if !force {
        println!(
            "\n{}",
            format!(
                "This will delete '{}' with its {} expenses.",
                group.name,
                group.expenses.len()
            )
            .yellow()
        );
        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            output::info("Cancelled");
            return Ok(());
        }
    }

    ctx.group_service.delete_group(&group.id)?;
    log_event(
        &get_logger(),
        LogEvent::new("group_deleted").with_group(&group.id).with_command("group delete"),
    );
    output::success(&format!("Group '{}' deleted", group.name));
    Ok(())
}
