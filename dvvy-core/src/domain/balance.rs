//! Balance and settlement value types
//!
//! These are the outputs of the balance engine. Amounts are plain decimals at
//! currency precision; the two policy constants below decide what counts as zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places money is rounded to
pub const CURRENCY_DECIMALS: u32 = 2;

/// Balances and payments whose magnitude is within this amount are treated as zero (0.01)
pub const SETTLEMENT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, CURRENCY_DECIMALS);

/// Round to cents, halves away from zero
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// True when `amount` is within the settlement tolerance of zero (inclusive)
pub fn is_settled(amount: Decimal) -> bool {
    amount.abs() <= SETTLEMENT_TOLERANCE
}

/// Net position of one member across all expenses of a group
///
/// Positive means the member is owed money, negative means they owe money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub member_id: String,
    pub amount: Decimal,
}

impl Balance {
    pub fn new(member_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            member_id: member_id.into(),
            amount,
        }
    }

    pub fn is_creditor(&self) -> bool {
        self.amount > SETTLEMENT_TOLERANCE
    }

    pub fn is_debtor(&self) -> bool {
        self.amount < -SETTLEMENT_TOLERANCE
    }

    pub fn is_settled(&self) -> bool {
        !self.is_creditor() && !self.is_debtor()
    }
}

/// A single directed payment instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

impl Settlement {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Decimal) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

/// Where a member stands with one other member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabStatus {
    Owes,
    GetsBack,
    Settled,
}

impl TabStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TabStatus::Owes => "Owes",
            TabStatus::GetsBack => "Gets back",
            TabStatus::Settled => "Settled",
        }
    }
}

/// One member's running tab with another member
///
/// Positive `amount` means `member_id` owes `other_member_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseTab {
    pub member_id: String,
    pub other_member_id: String,
    pub amount: Decimal,
}

impl PairwiseTab {
    pub fn status(&self) -> TabStatus {
        if self.amount > SETTLEMENT_TOLERANCE {
            TabStatus::Owes
        } else if self.amount < -SETTLEMENT_TOLERANCE {
            TabStatus::GetsBack
        } else {
            TabStatus::Settled
        }
    }
}
