use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use dvvy_core::domain::{Expense, Member, Split, SplitType, SETTLEMENT_TOLERANCE};
use dvvy_core::{calculate_balances, simplify_debts};

fn members(count: usize) -> Vec<Member> {
    (0..count)
        .map(|i| Member::new(format!("m{}", i), format!("Member {}", i)))
        .collect()
}

/// Split `amount_cents` exactly among the members picked by `mask`
///
/// Leftover cents go to the first participants, so the splits always add up.
fn expense(
    members: &[Member],
    payer_idx: usize,
    amount_cents: i64,
    mask: usize,
    unit: i64,
) -> Expense {
    let mut participants: Vec<&Member> = members
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1usize << *i) != 0)
        .map(|(_, m)| m)
        .collect();
    if participants.is_empty() {
        participants.push(&members[0]);
    }

    let units = amount_cents / unit;
    let n = participants.len() as i64;
    let splits = participants
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let share = units / n + i64::from((i as i64) < units % n);
            Split::new(m.id.clone(), Decimal::new(share * unit, 2))
        })
        .collect();

    Expense::new(
        "generated",
        Decimal::new(units * unit, 2),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        members[payer_idx % members.len()].id.clone(),
        SplitType::Unequal,
        splits,
    )
}

fn build(
    member_count: usize,
    raw: &[(usize, i64, usize)],
    unit: i64,
) -> (Vec<Member>, Vec<Expense>) {
    let members = members(member_count);
    let expenses = raw
        .iter()
        .map(|(payer, amount, mask)| expense(&members, *payer, (*amount).max(unit), *mask, unit))
        .collect();
    (members, expenses)
}

/// Net flow per member: paid out minus received
fn net_flows(members: &[Member], expenses: &[Expense]) -> HashMap<String, Decimal> {
    let mut net: HashMap<String, Decimal> = HashMap::new();
    for s in simplify_debts(members, expenses) {
        *net.entry(s.to.clone()).or_default() -= s.amount;
        *net.entry(s.from.clone()).or_default() += s.amount;
    }
    net
}

fn expense_strategy() -> impl Strategy<Value = Vec<(usize, i64, usize)>> {
    prop::collection::vec((0usize..8, 1i64..=1_000_000, 0usize..256), 0..=25)
}

proptest! {
    #[test]
    fn balances_sum_to_zero(
        member_count in 1usize..=8,
        raw in expense_strategy(),
    ) {
        let (members, expenses) = build(member_count, &raw, 1);
        let total: Decimal = calculate_balances(&members, &expenses)
            .iter()
            .map(|b| b.amount)
            .sum();
        prop_assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn settlements_conserve_whole_unit_balances(
        member_count in 1usize..=8,
        raw in expense_strategy(),
    ) {
        // Amounts in whole rupees never leave a sub-tolerance remainder
        let (members, expenses) = build(member_count, &raw, 100);
        let balances = calculate_balances(&members, &expenses);
        let net = net_flows(&members, &expenses);

        for balance in &balances {
            let flow = net.get(&balance.member_id).copied().unwrap_or_default();
            // Paying off a debt brings a negative balance up to zero
            prop_assert!(
                (balance.amount + flow).abs() <= SETTLEMENT_TOLERANCE,
                "member {} balance {} flow {}", balance.member_id, balance.amount, flow
            );
        }
    }

    #[test]
    fn settlements_conserve_cent_balances_approximately(
        member_count in 1usize..=8,
        raw in expense_strategy(),
    ) {
        let (members, expenses) = build(member_count, &raw, 1);
        let balances = calculate_balances(&members, &expenses);
        let net = net_flows(&members, &expenses);

        // Dropped sub-tolerance payments and near-zero members each leave at most a cent behind
        let bound = SETTLEMENT_TOLERANCE * Decimal::from(2 * member_count as i64);
        for balance in &balances {
            let flow = net.get(&balance.member_id).copied().unwrap_or_default();
            prop_assert!((balance.amount + flow).abs() <= bound);
        }
    }

    #[test]
    fn expense_order_does_not_matter(
        member_count in 1usize..=8,
        raw in expense_strategy(),
    ) {
        let (members, expenses) = build(member_count, &raw, 1);
        let mut reversed = expenses.clone();
        reversed.reverse();

        prop_assert_eq!(
            calculate_balances(&members, &expenses),
            calculate_balances(&members, &reversed)
        );
        prop_assert_eq!(
            simplify_debts(&members, &expenses),
            simplify_debts(&members, &reversed)
        );
    }

    #[test]
    fn settlement_count_is_bounded(
        member_count in 1usize..=8,
        raw in expense_strategy(),
    ) {
        let (members, expenses) = build(member_count, &raw, 1);
        let settlements = simplify_debts(&members, &expenses);

        let open = calculate_balances(&members, &expenses)
            .iter()
            .filter(|b| !b.is_settled())
            .count();
        prop_assert!(settlements.len() <= open.saturating_sub(1));
        for s in &settlements {
            prop_assert!(s.from != s.to);
            prop_assert!(s.amount > SETTLEMENT_TOLERANCE);
        }
    }
}
