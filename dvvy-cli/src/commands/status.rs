//! Status command - databases, totals and per-group summary

use anyhow::Result;
use colored::Colorize;
use comfy_table::Cell;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        return output::json(&status);
    }

    let symbol = &ctx.config.currency_symbol;
    println!("{}", "dvvy status".bold());
    if ctx.config.demo_mode {
        output::warning("Demo mode is on. Run 'dvvy demo off' to return to your own data.");
    }
    println!();

    let mut table = output::create_table();
    table.add_row(vec![Cell::new("Groups"), Cell::new(status.total_groups)]);
    table.add_row(vec![Cell::new("Members"), Cell::new(status.total_members)]);
    table.add_row(vec![Cell::new("Expenses"), Cell::new(status.total_expenses)]);
    table.add_row(vec![Cell::new("Total spent"), output::money_cell(symbol, status.total_spend)]);
    println!("{}", table);

    if !status.groups.is_empty() {
        println!();
        let mut groups = output::create_table();
        groups.set_header(vec!["Group", "Members", "Expenses", "Spent", "Open payments"]);
        for group in &status.groups {
            let open = if group.open_settlements == 0 {
                "settled".green().to_string()
            } else {
                group.open_settlements.to_string()
            };
            groups.add_row(vec![
                Cell::new(&group.name),
                Cell::new(group.members),
                Cell::new(group.expenses),
                output::money_cell(symbol, group.total_spend),
                Cell::new(open),
            ]);
        }
        println!("{}", groups);
    }

    println!();
    output::info(&format!("Database: {}", status.database));
    Ok(())
}
