//! Core domain entities
//!
//! Plain value records shared by every layer. No I/O happens here.

mod expense;
mod group;
mod member;
pub mod balance;
pub mod result;

pub use balance::{
    round_to_cents, Balance, PairwiseTab, Settlement, TabStatus, CURRENCY_DECIMALS,
    SETTLEMENT_TOLERANCE,
};
pub use expense::{Expense, Split, SplitType};
pub use group::Group;
pub use member::Member;
