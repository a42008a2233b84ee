//! Expense domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an expense was divided when it was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    /// Everyone in the group pays the same share
    Equal,
    /// Each participant has an explicit share
    Unequal,
    /// A chosen subset of members pays the same share
    Select,
}

impl SplitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitType::Equal => "equal",
            SplitType::Unequal => "unequal",
            SplitType::Select => "select",
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equal" => Ok(SplitType::Equal),
            "unequal" => Ok(SplitType::Unequal),
            "select" => Ok(SplitType::Select),
            other => Err(format!("unknown split type: {}", other)),
        }
    }
}

/// One member's share of an expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub member_id: String,
    pub amount: Decimal,
}

impl Split {
    pub fn new(member_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            member_id: member_id.into(),
            amount,
        }
    }
}

/// A single shared expense: one payer fronted `amount`, `splits` says who owes what
///
/// The splits are expected to sum to `amount`, but nothing downstream relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub paid_by: String,
    pub split_type: SplitType,
    pub splits: Vec<Split>,
}

impl Expense {
    /// Create a new expense with a generated id
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
        paid_by: impl Into<String>,
        split_type: SplitType,
        splits: Vec<Split>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            amount,
            date,
            paid_by: paid_by.into(),
            split_type,
            splits,
        }
    }

    /// Validate expense data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.description.trim().is_empty() {
            return Err("expense description cannot be empty");
        }
        if self.amount <= Decimal::ZERO {
            return Err("expense amount must be positive");
        }
        if self.paid_by.trim().is_empty() {
            return Err("expense must have a payer");
        }
        if self.splits.is_empty() {
            return Err("expense must be split between at least one member");
        }
        if self.splits.iter().any(|s| s.amount < Decimal::ZERO) {
            return Err("split amounts cannot be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dinner() -> Expense {
        Expense::new(
            "Dinner",
            Decimal::new(9000, 2),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            "a",
            SplitType::Equal,
            vec![
                Split::new("a", Decimal::new(3000, 2)),
                Split::new("b", Decimal::new(3000, 2)),
                Split::new("c", Decimal::new(3000, 2)),
            ],
        )
    }

    #[test]
    fn test_expense_validation() {
        let mut expense = dinner();
        assert!(expense.validate().is_ok());

        expense.amount = Decimal::ZERO;
        assert!(expense.validate().is_err());

        let mut expense = dinner();
        expense.splits[1].amount = Decimal::new(-1, 0);
        assert_eq!(expense.validate(), Err("split amounts cannot be negative"));
    }

    #[test]
    fn test_split_type_parsing() {
        assert_eq!("Equal".parse::<SplitType>().unwrap(), SplitType::Equal);
        assert_eq!(" select ".parse::<SplitType>().unwrap(), SplitType::Select);
        assert!("thirds".parse::<SplitType>().is_err());
    }

    #[test]
    fn test_expense_json_uses_app_field_names() {
        let json = serde_json::to_value(dinner()).unwrap();
        assert_eq!(json["paidBy"], "a");
        assert_eq!(json["splitType"], "equal");
        assert_eq!(json["splits"][0]["memberId"], "a");
        assert_eq!(json["date"], "2024-03-02");
    }
}
