//! Balance calculation - net position of every member in a group

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::{round_to_cents, Balance, Expense, Member};

/// Fold expenses into one signed, cent-rounded balance per member
///
/// The payer of each expense is credited the full amount and every split
/// member is debited their share, so a payer who is also in the splits nets
/// out naturally. The result has one entry per member, in `members` order.
/// Ids in `paid_by` or `splits` that are not in `members` still get a running
/// total internally but never appear in the output.
pub fn calculate_balances(members: &[Member], expenses: &[Expense]) -> Vec<Balance> {
    let mut totals: HashMap<&str, Decimal> = members
        .iter()
        .map(|m| (m.id.as_str(), Decimal::ZERO))
        .collect();

    for expense in expenses {
        *totals.entry(expense.paid_by.as_str()).or_insert(Decimal::ZERO) += expense.amount;

        for split in &expense.splits {
            *totals.entry(split.member_id.as_str()).or_insert(Decimal::ZERO) -= split.amount;
        }
    }

    members
        .iter()
        .map(|m| {
            let total = totals.get(m.id.as_str()).copied().unwrap_or(Decimal::ZERO);
            Balance::new(m.id.clone(), round_to_cents(total))
        })
        .collect()
}
