//! Group domain model

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Expense, Member};

/// A set of members sharing expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create a new, empty group
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            members,
            expenses: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Look up a member by id
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Display name for a member id, "Unknown" when the id is not in the group
    pub fn member_name<'a>(&'a self, member_id: &str) -> &'a str {
        self.member(member_id)
            .map(|m| m.name.as_str())
            .unwrap_or("Unknown")
    }

    /// Look up an expense by id
    pub fn expense(&self, expense_id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == expense_id)
    }

    /// Validate group data
    ///
    /// Member and expense ids must be unique, and every payer and split must
    /// reference a member of this group.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("group name cannot be empty");
        }
        if self.members.is_empty() {
            return Err("group must have at least one member");
        }

        let mut member_ids = HashSet::new();
        if !self.members.iter().all(|m| member_ids.insert(m.id.as_str())) {
            return Err("duplicate member id");
        }
        let mut expense_ids = HashSet::new();
        if !self.expenses.iter().all(|e| expense_ids.insert(e.id.as_str())) {
            return Err("duplicate expense id");
        }

        for expense in &self.expenses {
            if !member_ids.contains(expense.paid_by.as_str()) {
                return Err("expense paid by someone outside the group");
            }
            if expense
                .splits
                .iter()
                .any(|s| !member_ids.contains(s.member_id.as_str()))
            {
                return Err("expense split with someone outside the group");
            }
        }
        Ok(())
    }
}
