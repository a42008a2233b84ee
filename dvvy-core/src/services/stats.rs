//! Group statistics - totals, per-member spend and a spending timeline

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{round_to_cents, Expense, Member};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargestExpense {
    pub amount: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub total_expenses: Decimal,
    pub expense_count: usize,
    pub average_expense: Decimal,
    pub largest_expense: Option<LargestExpense>,
}

/// What a member fronted versus what their own share came to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStats {
    pub member_id: String,
    pub total_paid: Decimal,
    pub total_share: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseByDate {
    pub date: NaiveDate,
    pub total: Decimal,
}

/// Totals across all expenses of a group
///
/// The first of several equally large expenses is reported as the largest.
pub fn compute_group_stats(expenses: &[Expense]) -> GroupStats {
    let Some(first) = expenses.first() else {
        return GroupStats {
            total_expenses: Decimal::ZERO,
            expense_count: 0,
            average_expense: Decimal::ZERO,
            largest_expense: None,
        };
    };

    let total: Decimal = expenses.iter().map(|e| e.amount).sum();
    let mut largest = first;
    for expense in expenses {
        if expense.amount > largest.amount {
            largest = expense;
        }
    }

    GroupStats {
        total_expenses: total,
        expense_count: expenses.len(),
        average_expense: round_to_cents(total / Decimal::from(expenses.len())),
        largest_expense: Some(LargestExpense {
            amount: largest.amount,
            description: largest.description.clone(),
        }),
    }
}

/// Amount paid and share owed per member, in `members` order
pub fn compute_member_stats(members: &[Member], expenses: &[Expense]) -> Vec<MemberStats> {
    let mut paid: HashMap<&str, Decimal> = HashMap::new();
    let mut share: HashMap<&str, Decimal> = HashMap::new();

    for expense in expenses {
        *paid.entry(expense.paid_by.as_str()).or_insert(Decimal::ZERO) += expense.amount;
        for split in &expense.splits {
            *share.entry(split.member_id.as_str()).or_insert(Decimal::ZERO) += split.amount;
        }
    }

    members
        .iter()
        .map(|m| MemberStats {
            member_id: m.id.clone(),
            total_paid: round_to_cents(paid.get(m.id.as_str()).copied().unwrap_or_default()),
            total_share: round_to_cents(share.get(m.id.as_str()).copied().unwrap_or_default()),
        })
        .collect()
}

/// Spend per calendar day, oldest first
pub fn compute_expense_timeline(expenses: &[Expense]) -> Vec<ExpenseByDate> {
    let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for expense in expenses {
        *by_date.entry(expense.date).or_insert(Decimal::ZERO) += expense.amount;
    }

    by_date
        .into_iter()
        .map(|(date, total)| ExpenseByDate {
            date,
            total: round_to_cents(total),
        })
        .collect()
}
