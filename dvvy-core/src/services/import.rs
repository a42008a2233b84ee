//! Import service - load groups exported by the web app as JSON
//!
//! Accepts either a single group object or an array of groups, with the
//! web app's camelCase keys (`paidBy`, `splitType`, `memberId`, `createdAt`)
//! and amounts as plain JSON numbers.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result as DomainResult};
use crate::domain::{Expense, Group, Member, Split, SplitType};
use crate::ports::GroupRepository;

/// Import options
#[derive(Debug, Default)]
pub struct ImportOptions {
    /// Replace groups whose id already exists instead of failing
    pub replace: bool,
    /// Parse and validate only, store nothing
    pub preview_only: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub groups: Vec<ImportedGroup>,
    pub replaced: usize,
    pub preview: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportedGroup {
    pub id: String,
    pub name: String,
    pub members: usize,
    pub expenses: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportPayload {
    Many(Vec<RawGroup>),
    One(RawGroup),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGroup {
    id: String,
    name: String,
    members: Vec<Member>,
    #[serde(default)]
    expenses: Vec<RawExpense>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExpense {
    id: String,
    description: String,
    amount: f64,
    date: String,
    paid_by: String,
    split_type: SplitType,
    #[serde(default)]
    splits: Vec<RawSplit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSplit {
    member_id: String,
    amount: f64,
}

/// Convert a JSON number to an exact decimal via its shortest textual form
fn to_decimal(value: f64, what: &str) -> DomainResult<Decimal> {
    if !value.is_finite() {
        return Err(Error::validation(format!("{} is not a finite number", what)));
    }
    Decimal::from_str(&value.to_string())
        .map_err(|e| Error::validation(format!("{} is out of range: {}", what, e)))
}

/// Dates are `YYYY-MM-DD`; full ISO timestamps are cut to their date
fn parse_date(raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| Error::validation(format!("invalid date '{}'", raw)))
}

fn parse_created_at(raw: Option<&str>) -> DomainResult<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| Error::validation(format!("invalid createdAt '{}'", raw))),
    }
}

impl RawExpense {
    fn into_expense(self) -> DomainResult<Expense> {
        let what = format!("amount of expense {}", self.id);
        let amount = to_decimal(self.amount, &what)?;
        let splits = self
            .splits
            .into_iter()
            .map(|s| {
                let what = format!("split of {} in expense {}", s.member_id, self.id);
                Ok(Split::new(s.member_id, to_decimal(s.amount, &what)?))
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let expense = Expense {
            id: self.id,
            description: self.description,
            amount,
            date: parse_date(&self.date)?,
            paid_by: self.paid_by,
            split_type: self.split_type,
            splits,
        };
        expense
            .validate()
            .map_err(|e| Error::validation(format!("expense {}: {}", expense.id, e)))?;
        Ok(expense)
    }
}

impl RawGroup {
    fn into_group(self) -> DomainResult<Group> {
        let group = Group {
            created_at: parse_created_at(self.created_at.as_deref())?,
            expenses: self
                .expenses
                .into_iter()
                .map(RawExpense::into_expense)
                .collect::<DomainResult<Vec<_>>>()?,
            id: self.id,
            name: self.name,
            members: self.members,
        };
        group
            .validate()
            .map_err(|e| Error::validation(format!("group {}: {}", group.id, e)))?;
        for member in &group.members {
            member
                .validate()
                .map_err(|e| Error::validation(format!("group {}: {}", group.id, e)))?;
        }
        Ok(group)
    }
}

/// Parse a JSON document into groups without touching storage
pub fn parse_groups(json: &str) -> Result<Vec<Group>> {
    let payload: ImportPayload = serde_json::from_str(json).context("Invalid group JSON")?;
    let raw = match payload {
        ImportPayload::Many(groups) => groups,
        ImportPayload::One(group) => vec![group],
    };
    Ok(raw
        .into_iter()
        .map(RawGroup::into_group)
        .collect::<DomainResult<Vec<_>>>()?)
}

/// Import service for JSON group files
pub struct ImportService {
    repository: Arc<dyn GroupRepository>,
}

impl ImportService {
    pub fn new(repository: Arc<dyn GroupRepository>) -> Self {
        Self { repository }
    }

    /// Import every group in `json`
    ///
    /// All groups are parsed, validated and checked against storage before
    /// anything is written, and then stored in a single transaction.
    pub fn import(&self, json: &str, options: &ImportOptions) -> Result<ImportResult> {
        let groups = parse_groups(json)?;

        let mut seen = HashSet::new();
        if let Some(dup) = groups.iter().find(|g| !seen.insert(g.id.as_str())) {
            anyhow::bail!("Group id {} appears more than once in the import", dup.id);
        }

        let mut replaced = 0;
        for group in &groups {
            if self.repository.get_group(&group.id)?.is_some() {
                if !options.replace {
                    anyhow::bail!(
                        "Group {} ({}) already exists; use --replace to overwrite it",
                        group.name,
                        group.id
                    );
                }
                replaced += 1;
            }
        }

        if !options.preview_only {
            self.repository
                .save_groups(&groups)
                .context("Failed to store imported groups")?;
        }

        Ok(ImportResult {
            groups: groups
                .iter()
                .map(|g| ImportedGroup {
                    id: g.id.clone(),
                    name: g.name.clone(),
                    members: g.members.len(),
                    expenses: g.expenses.len(),
                })
                .collect(),
            replaced,
            preview: options.preview_only,
        })
    }
}
