//! Report commands - balances, settlements, pairwise tabs and statistics

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;

use dvvy_core::domain::TabStatus;
use dvvy_core::services::{GroupService, SummaryService};

use super::load_group;
use crate::output;

/// Net balance per member
pub fn run_balances(group: &str, json: bool) -> Result<()> {
    let (ctx, group) = load_group(group)?;
    let summary = SummaryService::summarize(&group);

    if json {
        return output::json(&summary.balances);
    }

    let symbol = &ctx.config.currency_symbol;
    println!("{}", format!("Balances · {}", group.name).bold());

    let mut table = output::create_table();
    table.set_header(vec!["Member", "Balance", "Status"]);
    for balance in &summary.balances {
        let status = if balance.is_creditor() {
            "gets back".green().to_string()
        } else if balance.is_debtor() {
            "owes".red().to_string()
        } else {
            "settled".dimmed().to_string()
        };
        table.add_row(vec![
            Cell::new(group.member_name(&balance.member_id)),
            Cell::new(output::signed_money(symbol, balance.amount)),
            Cell::new(status),
        ]);
    }
    println!("{}", table);
    Ok(())
}

/// Simplified list of payments that settles the group
pub fn run_settle(group: &str, json: bool) -> Result<()> {
    let (ctx, group) = load_group(group)?;
    let summary = SummaryService::summarize(&group);

    if json {
        return output::json(&summary.settlements);
    }

    if summary.all_settled() {
        output::success(&format!("{} is all settled up", group.name));
        return Ok(());
    }

    let symbol = &ctx.config.currency_symbol;
    println!("{}", format!("Settle up · {}", group.name).bold());

    let mut table = output::create_table();
    table.set_header(vec!["From", "To", "Amount"]);
    for settlement in &summary.settlements {
        table.add_row(vec![
            Cell::new(group.member_name(&settlement.from)),
            Cell::new(group.member_name(&settlement.to)),
            output::money_cell(symbol, settlement.amount),
        ]);
    }
    println!("{}", table);
    output::info(&format!("{} payments", summary.settlements.len()));
    Ok(())
}

/// Who owes whom, seen from each member (optionally just one)
pub fn run_tabs(group: &str, member: Option<&str>, json: bool) -> Result<()> {
    let (ctx, group) = load_group(group)?;
    let summary = SummaryService::summarize(&group);

    let focus = match member {
        Some(key) => Some(GroupService::resolve_member(&group, key)?.id.clone()),
        None => None,
    };
    let tabs: Vec<_> = summary
        .tabs
        .iter()
        .filter(|t| focus.as_deref().map_or(true, |id| t.member_id == id))
        .collect();

    if json {
        return output::json(&tabs);
    }

    if tabs.is_empty() {
        output::success("No open tabs");
        return Ok(());
    }

    let symbol = &ctx.config.currency_symbol;
    let mut current: Option<&str> = None;
    for tab in tabs {
        if current != Some(tab.member_id.as_str()) {
            if current.is_some() {
                println!();
            }
            println!("{}", group.member_name(&tab.member_id).bold());
            current = Some(tab.member_id.as_str());
        }

        let amount = output::money(symbol, tab.amount.abs());
        let line = match tab.status() {
            TabStatus::Owes => format!("owes {} {}", group.member_name(&tab.other_member_id), amount).red(),
            TabStatus::GetsBack => {
                format!("gets back {} from {}", amount, group.member_name(&tab.other_member_id)).green()
            }
            TabStatus::Settled => format!("settled with {}", group.member_name(&tab.other_member_id)).dimmed(),
        };
        println!("  {}", line);
    }
    Ok(())
}

/// Totals, per-member spend and the daily timeline
pub fn run_stats(group: &str, json: bool) -> Result<()> {
    let (ctx, group) = load_group(group)?;
    let summary = SummaryService::summarize(&group);

    if json {
        return output::json(&serde_json::json!({
            "group": summary.group_stats,
            "members": summary.member_stats,
            "timeline": summary.timeline,
        }));
    }

    let symbol = &ctx.config.currency_symbol;
    let stats = &summary.group_stats;
    println!("{}", format!("Statistics · {}", group.name).bold());

    let mut table = output::create_table();
    table.add_row(vec![Cell::new("Total spent"), output::money_cell(symbol, stats.total_expenses)]);
    table.add_row(vec![Cell::new("Expenses"), Cell::new(stats.expense_count)]);
    table.add_row(vec![Cell::new("Average expense"), output::money_cell(symbol, stats.average_expense)]);
    if let Some(largest) = &stats.largest_expense {
        table.add_row(vec![
            Cell::new(format!("Largest ({})", largest.description)),
            output::money_cell(symbol, largest.amount),
        ]);
    }
    println!("{}", table);

    println!();
    let mut members = output::create_table();
    members.set_header(vec!["Member", "Paid", "Share"]);
    for m in &summary.member_stats {
        members.add_row(vec![
            Cell::new(group.member_name(&m.member_id)),
            output::money_cell(symbol, m.total_paid),
            output::money_cell(symbol, m.total_share),
        ]);
    }
    println!("{}", members);

    if !summary.timeline.is_empty() {
        println!();
        let mut timeline = output::create_table();
        timeline.set_header(vec!["Date", "Spent"]);
        for day in &summary.timeline {
            timeline.add_row(vec![
                Cell::new(day.date.format("%Y-%m-%d")),
                output::money_cell(symbol, day.total),
            ]);
        }
        println!("{}", timeline);
    }
    Ok(())
}
