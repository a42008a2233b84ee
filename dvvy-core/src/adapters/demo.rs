//! Demo data provider
//!
//! A small, fixed trip group that exercises every split type, so balances,
//! settlements and tabs all have something to show.

use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{Expense, Group, Member};
use crate::services::split::{build_splits, SplitRequest};

pub const DEMO_GROUP_ID: &str = "demo-goa-trip";

fn demo_date(day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 12, day)
        .ok_or_else(|| Error::Other(format!("invalid demo date: 2024-12-{}", day)))
}

/// Generate the demo group with its members and expenses
pub fn generate_demo_group() -> Result<Group> {
    let members = vec![
        Member::new("demo-asha", "Asha"),
        Member::new("demo-ravi", "Ravi"),
        Member::new("demo-meera", "Meera"),
        Member::new("demo-kiran", "Kiran"),
    ];

    let select = |ids: &[&str]| SplitRequest::Select {
        member_ids: ids.iter().map(|id| id.to_string()).collect(),
    };
    let unequal = |amounts: &[(&str, i64)]| SplitRequest::Unequal {
        amounts: amounts
            .iter()
            .map(|(id, cents)| (id.to_string(), Decimal::new(*cents, 2)))
            .collect::<HashMap<_, _>>(),
    };

    // (id, description, amount in cents, day, payer, split)
    let plan = vec![
        ("demo-e1", "Beach shack dinner", 480000, 26, "demo-asha", SplitRequest::Equal),
        ("demo-e2", "Scooter rental", 150000, 26, "demo-ravi", select(&["demo-ravi", "demo-meera", "demo-kiran"])),
        ("demo-e3", "Villa booking", 2400000, 27, "demo-meera", unequal(&[
            ("demo-asha", 600000),
            ("demo-ravi", 600000),
            ("demo-meera", 800000),
            ("demo-kiran", 400000),
        ])),
        ("demo-e4", "Fort entry tickets", 100000, 28, "demo-kiran", SplitRequest::Equal),
        ("demo-e5", "Airport cab", 99900, 29, "demo-asha", select(&["demo-asha", "demo-kiran"])),
    ];

    let mut expenses = Vec::with_capacity(plan.len());
    for (id, description, cents, day, payer, request) in plan {
        let amount = Decimal::new(cents, 2);
        let splits = build_splits(amount, &request, &members)?;
        let mut expense = Expense::new(description, amount, demo_date(day)?, payer, request.split_type(), splits);
        expense.id = id.to_string();
        expenses.push(expense);
    }

    let created_at = Utc
        .with_ymd_and_hms(2024, 12, 25, 9, 0, 0)
        .single()
        .ok_or_else(|| Error::Other("invalid demo timestamp".to_string()))?;

    Ok(Group {
        id: DEMO_GROUP_ID.to_string(),
        name: "Goa Trip".to_string(),
        members,
        expenses,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_group_is_valid() {
        let group = generate_demo_group().unwrap();
        assert!(group.validate().is_ok());
        assert_eq!(group.members.len(), 4);
        assert_eq!(group.expenses.len(), 5);
        for expense in &group.expenses {
            assert!(expense.validate().is_ok(), "{} is invalid", expense.description);
        }
    }

    #[test]
    fn test_demo_splits_follow_request() {
        let group = generate_demo_group().unwrap();
        let scooter = group.expense("demo-e2").unwrap();
        assert_eq!(scooter.splits.len(), 3);
        assert!(scooter.splits.iter().all(|s| s.amount == Decimal::new(50000, 2)));

        let cab = group.expense("demo-e5").unwrap();
        assert_eq!(cab.splits[0].amount, Decimal::new(49950, 2));
    }
}
