//! Export service - CSV reports for a group
//!
//! Reports use member names rather than ids and print amounts with two
//! decimals, so they open cleanly in a spreadsheet.

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::domain::{round_to_cents, Group};
use crate::services::summary::SummaryService;

/// Which report to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportReport {
    Balances,
    Settlements,
    Expenses,
    Tabs,
}

impl ExportReport {
    pub const ALL: [ExportReport; 4] = [
        ExportReport::Balances,
        ExportReport::Settlements,
        ExportReport::Expenses,
        ExportReport::Tabs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportReport::Balances => "balances",
            ExportReport::Settlements => "settlements",
            ExportReport::Expenses => "expenses",
            ExportReport::Tabs => "tabs",
        }
    }
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportReport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balances" => Ok(ExportReport::Balances),
            "settlements" | "settle" => Ok(ExportReport::Settlements),
            "expenses" => Ok(ExportReport::Expenses),
            "tabs" => Ok(ExportReport::Tabs),
            other => Err(format!(
                "unknown report '{}' (expected balances, settlements, expenses or tabs)",
                other
            )),
        }
    }
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", round_to_cents(amount))
}

/// Stateless CSV writer for group reports
pub struct ExportService;

impl ExportService {
    /// Write one report as CSV to `out`
    pub fn write_report<W: Write>(group: &Group, report: ExportReport, out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        let summary = SummaryService::summarize(group);

        match report {
            ExportReport::Balances => {
                writer.write_record(["member", "balance", "status"])?;
                for balance in &summary.balances {
                    let status = if balance.is_creditor() {
                        "gets back"
                    } else if balance.is_debtor() {
                        "owes"
                    } else {
                        "settled"
                    };
                    writer.write_record([
                        group.member_name(&balance.member_id),
                        money(balance.amount).as_str(),
                        status,
                    ])?;
                }
            }
            ExportReport::Settlements => {
                writer.write_record(["from", "to", "amount"])?;
                for settlement in &summary.settlements {
                    writer.write_record([
                        group.member_name(&settlement.from),
                        group.member_name(&settlement.to),
                        money(settlement.amount).as_str(),
                    ])?;
                }
            }
            ExportReport::Expenses => {
                writer.write_record([
                    "date",
                    "description",
                    "amount",
                    "paid_by",
                    "split_type",
                    "splits",
                ])?;
                for expense in &group.expenses {
                    let splits = expense
                        .splits
                        .iter()
                        .map(|s| format!("{}: {}", group.member_name(&s.member_id), money(s.amount)))
                        .collect::<Vec<_>>()
                        .join("; ");
                    writer.write_record([
                        expense.date.format("%Y-%m-%d").to_string().as_str(),
                        expense.description.as_str(),
                        money(expense.amount).as_str(),
                        group.member_name(&expense.paid_by),
                        expense.split_type.as_str(),
                        splits.as_str(),
                    ])?;
                }
            }
            ExportReport::Tabs => {
                writer.write_record(["member", "other_member", "amount", "status"])?;
                for tab in &summary.tabs {
                    writer.write_record([
                        group.member_name(&tab.member_id),
                        group.member_name(&tab.other_member_id),
                        money(tab.amount.abs()).as_str(),
                        tab.status().label(),
                    ])?;
                }
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Write one report to a file
    pub fn export_to_path(group: &Group, report: ExportReport, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Self::write_report(group, report, file)
    }

    /// Write every report into `dir` as `<group>-<report>.csv`, returning the paths
    pub fn export_all(group: &Group, dir: &Path) -> Result<Vec<std::path::PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let stem = file_stem(&group.name);
        let mut written = Vec::with_capacity(ExportReport::ALL.len());
        for report in ExportReport::ALL {
            let path = dir.join(format!("{}-{}.csv", stem, report));
            Self::export_to_path(group, report, &path)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Lowercase, dash-separated name safe for file systems
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if stem.is_empty() {
        "group".to_string()
    } else {
        stem
    }
}
