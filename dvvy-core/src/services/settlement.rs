//! Debt simplification - who pays whom to settle a group
//!
//! Greedy min-cash-flow: the largest remaining debtor pays the largest
//! remaining creditor as much as either side allows, until one side runs out.
//! Fast and deterministic, but not guaranteed to find the smallest possible
//! number of payments.

use rust_decimal::Decimal;

use crate::domain::{round_to_cents, Expense, Member, Settlement, SETTLEMENT_TOLERANCE};

use super::balance::calculate_balances;

/// A debtor or creditor with the magnitude still left to settle
#[derive(Debug)]
struct Party<'a> {
    member_id: &'a str,
    remaining: Decimal,
}

/// Compute the payments that bring every member's balance to zero
///
/// Members within the settlement tolerance of zero are left out. Debtors and
/// creditors are ordered by magnitude, largest first; ties keep their order in
/// `members`. Settlements come back in the order they were generated.
pub fn simplify_debts(members: &[Member], expenses: &[Expense]) -> Vec<Settlement> {
    let balances = calculate_balances(members, expenses);

    let mut debtors: Vec<Party<'_>> = Vec::new();
    let mut creditors: Vec<Party<'_>> = Vec::new();

    for balance in &balances {
        if balance.is_debtor() {
            debtors.push(Party {
                member_id: &balance.member_id,
                remaining: -balance.amount,
            });
        } else if balance.is_creditor() {
            creditors.push(Party {
                member_id: &balance.member_id,
                remaining: balance.amount,
            });
        }
    }

    // sort_by is stable, so equal magnitudes stay in member order
    debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    let mut settlements = Vec::new();
    let mut i = 0;
    let mut j = 0;

    // Each pass exhausts at least one side, so this runs at most
    // debtors.len() + creditors.len() - 1 times.
    while i < debtors.len() && j < creditors.len() {
        let payment = debtors[i].remaining.min(creditors[j].remaining);

        if payment > SETTLEMENT_TOLERANCE {
            settlements.push(Settlement::new(
                debtors[i].member_id,
                creditors[j].member_id,
                round_to_cents(payment),
            ));
        }

        debtors[i].remaining -= payment;
        creditors[j].remaining -= payment;

        if debtors[i].remaining < SETTLEMENT_TOLERANCE {
            i += 1;
        }
        if creditors[j].remaining < SETTLEMENT_TOLERANCE {
            j += 1;
        }
    }

    settlements
}
