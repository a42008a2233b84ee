//! Split builder - turn an expense total and a split choice into per-member shares

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{round_to_cents, Member, Split, SplitType, SETTLEMENT_TOLERANCE};

/// How the user asked for an expense to be divided
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRequest {
    /// Everyone in the group pays the same share
    Equal,
    /// Only the listed members pay, in equal shares
    Select { member_ids: Vec<String> },
    /// Explicit amount per member id
    Unequal { amounts: HashMap<String, Decimal> },
}

impl SplitRequest {
    pub fn split_type(&self) -> SplitType {
        match self {
            SplitRequest::Equal => SplitType::Equal,
            SplitRequest::Select { .. } => SplitType::Select,
            SplitRequest::Unequal { .. } => SplitType::Unequal,
        }
    }
}

/// Build the splits for an expense of `total` among `members`
///
/// Equal and select shares are `total / n` rounded to cents, so they can be a
/// cent or two off `total`. Unequal amounts must add up to `total` within the
/// settlement tolerance; zero amounts are dropped. Splits follow `members` order.
pub fn build_splits(total: Decimal, request: &SplitRequest, members: &[Member]) -> Result<Vec<Split>> {
    if total <= Decimal::ZERO {
        return Err(Error::validation("expense amount must be positive"));
    }

    match request {
        SplitRequest::Equal => {
            if members.is_empty() {
                return Err(Error::validation("group has no members to split between"));
            }
            Ok(equal_shares(total, members.iter()))
        }
        SplitRequest::Select { member_ids } => {
            let selected: Vec<&Member> = members
                .iter()
                .filter(|m| member_ids.iter().any(|id| *id == m.id))
                .collect();
            if selected.is_empty() {
                return Err(Error::validation("select at least one member to split between"));
            }
            Ok(equal_shares(total, selected.into_iter()))
        }
        SplitRequest::Unequal { amounts } => {
            if let Some(unknown) = amounts.keys().find(|id| !members.iter().any(|m| &m.id == *id)) {
                return Err(Error::validation(format!("unknown member in split: {}", unknown)));
            }

            let mut splits = Vec::new();
            let mut sum = Decimal::ZERO;
            for member in members {
                let amount = amounts.get(&member.id).copied().unwrap_or(Decimal::ZERO);
                if amount < Decimal::ZERO {
                    return Err(Error::validation(format!(
                        "split amount for {} cannot be negative",
                        member.name
                    )));
                }
                if amount > Decimal::ZERO {
                    splits.push(Split::new(member.id.clone(), amount));
                    sum += amount;
                }
            }

            let difference = round_to_cents(total - sum);
            if difference.abs() >= SETTLEMENT_TOLERANCE {
                return Err(Error::validation(format!(
                    "split amounts add up to {} but the expense is {} (difference {})",
                    sum, total, difference
                )));
            }
            Ok(splits)
        }
    }
}

fn equal_shares<'a>(total: Decimal, members: impl ExactSizeIterator<Item = &'a Member>) -> Vec<Split> {
    let share = round_to_cents(total / Decimal::from(members.len()));
    members.map(|m| Split::new(m.id.clone(), share)).collect()
}
