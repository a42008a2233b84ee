//! Pairwise tabs - each member's view of the simplified settlements

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::{round_to_cents, Expense, Member, PairwiseTab};

use super::settlement::simplify_debts;

/// Per-member "who pays whom" tabs derived from [`simplify_debts`]
///
/// For every member, in `members` order, one tab per other member they share
/// at least one settlement with. A positive amount means the member owes the
/// other one; each settlement shows up twice, once from each side.
pub fn compute_pairwise_tabs(members: &[Member], expenses: &[Expense]) -> Vec<PairwiseTab> {
    let settlements = simplify_debts(members, expenses);

    let mut net: HashMap<(&str, &str), Decimal> = HashMap::new();
    for s in &settlements {
        *net.entry((s.from.as_str(), s.to.as_str())).or_insert(Decimal::ZERO) += s.amount;
        *net.entry((s.to.as_str(), s.from.as_str())).or_insert(Decimal::ZERO) -= s.amount;
    }

    let mut tabs = Vec::new();
    for member in members {
        for other in members {
            if other.id == member.id {
                continue;
            }
            if let Some(amount) = net.get(&(member.id.as_str(), other.id.as_str())) {
                tabs.push(PairwiseTab {
                    member_id: member.id.clone(),
                    other_member_id: other.id.clone(),
                    amount: round_to_cents(*amount),
                });
            }
        }
    }

    tabs
}
