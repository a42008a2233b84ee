//! Expense command - record, edit, delete and list expenses

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use comfy_table::Cell;
use dialoguer::Confirm;
use rust_decimal::Decimal;

use dvvy_core::services::{ExpenseInput, GroupService, LogEvent, SplitRequest};
use dvvy_core::{Expense, Group, SplitType};

use super::{get_logger, load_group, log_event};
use crate::output;

/// How to split an expense; `--share` implies unequal, `--among` implies select
#[derive(Args)]
pub struct SplitArgs {
    /// Split type (equal, select, unequal)
    #[arg(long)]
    split: Option<SplitType>,
    /// Members sharing the expense equally (select split)
    #[arg(long, value_delimiter = ',')]
    among: Vec<String>,
    /// Member share as NAME=AMOUNT (unequal split, repeat or comma-separate)
    #[arg(long = "share", value_delimiter = ',')]
    shares: Vec<String>,
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// Group id or name
        group: String,
        /// What the money was spent on
        #[arg(short, long)]
        description: String,
        /// Total amount
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Decimal,
        /// Member who paid (name or id)
        #[arg(short, long)]
        paid_by: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        split: SplitArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change an expense; omitted fields keep their current value
    Edit {
        /// Group id or name
        group: String,
        /// Expense id
        expense_id: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Option<Decimal>,
        #[arg(short, long)]
        paid_by: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        split: SplitArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an expense
    Delete {
        /// Group id or name
        group: String,
        /// Expense id
        expense_id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
    /// List a group's expenses
    List {
        /// Group id or name
        group: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: ExpenseCommands) -> Result<()> {
    match command {
        ExpenseCommands::Add {
            group,
            description,
            amount,
            paid_by,
            date,
            split,
            json,
        } => {
            let (ctx, group) = load_group(&group)?;
            let input = ExpenseInput {
                description,
                amount,
                date: date.unwrap_or_else(|| Utc::now().date_naive()),
                paid_by: GroupService::resolve_member(&group, &paid_by)?.id.clone(),
                split: split_request(&group, &split, None)?,
            };

            let expense = ctx.group_service.add_expense(&group.id, input)?;
            log_event(
                &get_logger(),
                LogEvent::new("expense_added").with_group(&group.id).with_command("expense add"),
            );
            print_saved(&ctx.config.currency_symbol, &group, &expense, "Recorded", json)
        }
        ExpenseCommands::Edit {
            group,
            expense_id,
            description,
            amount,
            paid_by,
            date,
            split,
            json,
        } => {
            let (ctx, group) = load_group(&group)?;
            let current = group
                .expense(&expense_id)
                .ok_or_else(|| anyhow!("No expense {} in {}", expense_id, group.name))?;

            let paid_by = match paid_by {
                Some(key) => GroupService::resolve_member(&group, &key)?.id.clone(),
                None => current.paid_by.clone(),
            };
            let input = ExpenseInput {
                description: description.unwrap_or_else(|| current.description.clone()),
                amount: amount.unwrap_or(current.amount),
                date: date.unwrap_or(current.date),
                paid_by,
                split: split_request(&group, &split, Some(current))?,
            };

            let expense = ctx.group_service.edit_expense(&group.id, &expense_id, input)?;
            log_event(
                &get_logger(),
                LogEvent::new("expense_edited").with_group(&group.id).with_command("expense edit"),
            );
            print_saved(&ctx.config.currency_symbol, &group, &expense, "Updated", json)
        }
        ExpenseCommands::Delete {
            group,
            expense_id,
            force,
        } => {
            let (ctx, group) = load_group(&group)?;
            let expense = group
                .expense(&expense_id)
                .ok_or_else(|| anyhow!("No expense {} in {}", expense_id, group.name))?;

            if !force {
                println!(
                    "\n{}",
                    format!(
                        "This will delete '{}' ({}).",
                        expense.description,
                        output::money(&ctx.config.currency_symbol, expense.amount)
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

            ctx.group_service.delete_expense(&group.id, &expense_id)?;
            log_event(
                &get_logger(),
                LogEvent::new("expense_deleted").with_group(&group.id).with_command("expense delete"),
            );
            output::success(&format!("Deleted '{}'", expense.description));
            Ok(())
        }
        ExpenseCommands::List { group, json } => {
            let (ctx, group) = load_group(&group)?;
            if json {
                return output::json(&group.expenses);
            }
            if group.expenses.is_empty() {
                output::info(&format!("No expenses in {} yet.", group.name));
                return Ok(());
            }

            let symbol = &ctx.config.currency_symbol;
            let mut table = output::create_table();
            table.set_header(vec!["Date", "Description", "Amount", "Paid by", "Split", "ID"]);
            for expense in &group.expenses {
                table.add_row(vec![
                    Cell::new(expense.date.format("%Y-%m-%d")),
                    Cell::new(&expense.description),
                    output::money_cell(symbol, expense.amount),
                    Cell::new(group.member_name(&expense.paid_by)),
                    Cell::new(split_summary(&group, expense)),
                    Cell::new(&expense.id),
                ]);
            }
            println!("{}", table);
            Ok(())
        }
    }
}

/// Turn the split flags into a request, falling back to `current`'s split when editing
fn split_request(group: &Group, args: &SplitArgs, current: Option<&Expense>) -> Result<SplitRequest> {
    let split_type = match (args.split, args.shares.is_empty(), args.among.is_empty()) {
        (Some(t), _, _) => t,
        (None, false, _) => SplitType::Unequal,
        (None, true, false) => SplitType::Select,
        (None, true, true) => match current {
            Some(expense) => return Ok(existing_request(expense)),
            None => SplitType::Equal,
        },
    };

    match split_type {
        SplitType::Equal => Ok(SplitRequest::Equal),
        SplitType::Select => {
            if args.among.is_empty() {
                bail!("A select split needs --among <members>");
            }
            let member_ids = args
                .among
                .iter()
                .map(|key| Ok(GroupService::resolve_member(group, key)?.id.clone()))
                .collect::<Result<Vec<_>>>()?;
            Ok(SplitRequest::Select { member_ids })
        }
        SplitType::Unequal => {
            if args.shares.is_empty() {
                bail!("An unequal split needs --share NAME=AMOUNT for each member who pays a share");
            }
            let mut amounts = HashMap::new();
            for raw in &args.shares {
                let (key, amount) = raw
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Invalid share '{}', expected NAME=AMOUNT", raw))?;
                let amount: Decimal = amount
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid amount in share '{}'", raw))?;
                let id = GroupService::resolve_member(group, key.trim())?.id.clone();
                if amounts.insert(id, amount).is_some() {
                    bail!("{} has more than one share", key.trim());
                }
            }
            Ok(SplitRequest::Unequal { amounts })
        }
    }
}

/// The request that would reproduce an existing expense's split
fn existing_request(expense: &Expense) -> SplitRequest {
    match expense.split_type {
        SplitType::Equal => SplitRequest::Equal,
        SplitType::Select => SplitRequest::Select {
            member_ids: expense.splits.iter().map(|s| s.member_id.clone()).collect(),
        },
        SplitType::Unequal => SplitRequest::Unequal {
            amounts: expense
                .splits
                .iter()
                .map(|s| (s.member_id.clone(), s.amount))
                .collect(),
        },
    }
}

fn split_summary(group: &Group, expense: &Expense) -> String {
    match expense.split_type {
        SplitType::Equal => "equal".to_string(),
        _ => expense
            .splits
            .iter()
            .map(|s| group.member_name(&s.member_id))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn print_saved(symbol: &str, group: &Group, expense: &Expense, verb: &str, json: bool) -> Result<()> {
    if json {
        return output::json(expense);
    }

    output::success(&format!(
        "{} '{}' ({}) paid by {}",
        verb,
        expense.description,
        output::money(symbol, expense.amount),
        group.member_name(&expense.paid_by)
    ));
    for split in &expense.splits {
        println!("  {:<20} {}", group.member_name(&split.member_id), output::money(symbol, split.amount));
    }
    output::info(&format!("id: {}", expense.id));
    Ok(())
}
