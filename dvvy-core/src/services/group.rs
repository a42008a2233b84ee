//! Group service - create groups and manage their members and expenses

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::result::Error;
use crate::domain::{Expense, Group, Member};
use crate::ports::GroupRepository;
use crate::services::split::{build_splits, SplitRequest};

/// Everything needed to record (or re-record) an expense
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    /// Member id of the payer
    pub paid_by: String,
    pub split: SplitRequest,
}

/// Group service for creating and editing groups
pub struct GroupService {
    repository: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(repository: Arc<dyn GroupRepository>) -> Self {
        Self { repository }
    }

    /// Create a group with the given member names
    pub fn create_group(&self, name: &str, member_names: &[String]) -> Result<Group> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Group name cannot be empty");
        }

        let mut members = Vec::with_capacity(member_names.len());
        for raw in member_names {
            let member_name = raw.trim();
            if member_name.is_empty() {
                bail!("Member names cannot be empty");
            }
            members.push(Member::with_name(member_name));
        }
        if members.is_empty() {
            bail!("A group needs at least one member");
        }

        let group = Group::new(name, members);
        self.repository.create_group(&group)?;
        Ok(group)
    }

    pub fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.repository.list_groups()?)
    }

    /// Find a group by id, falling back to a case-insensitive name match
    pub fn find_group(&self, key: &str) -> Result<Group> {
        if let Some(group) = self.repository.get_group(key)? {
            return Ok(group);
        }

        let wanted = key.trim().to_lowercase();
        let mut matches: Vec<Group> = self
            .repository
            .list_groups()?
            .into_iter()
            .filter(|g| g.name.to_lowercase() == wanted)
            .collect();

        match matches.len() {
            0 => Err(anyhow!("Group not found: {}", key)),
            1 => Ok(matches.remove(0)),
            n => Err(anyhow!(
                "{} groups are named '{}'; use the group id instead",
                n,
                key
            )),
        }
    }

    /// Delete a group and everything in it
    pub fn delete_group(&self, group_id: &str) -> Result<()> {
        self.repository
            .delete_group(group_id)
            .with_context(|| format!("Failed to delete group {}", group_id))
    }

    /// Add a member by name to an existing group
    pub fn add_member(&self, group_id: &str, name: &str) -> Result<Member> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Member name cannot be empty");
        }
        let member = Member::with_name(name);
        self.repository.add_member(group_id, &member)?;
        Ok(member)
    }

    /// Record a new expense in a group
    pub fn add_expense(&self, group_id: &str, input: ExpenseInput) -> Result<Expense> {
        let group = self.load(group_id)?;
        let expense = Self::build_expense(&group, input)?;
        self.repository.add_expense(&group.id, &expense)?;
        Ok(expense)
    }

    /// Replace an existing expense, keeping its id
    pub fn edit_expense(&self, group_id: &str, expense_id: &str, input: ExpenseInput) -> Result<Expense> {
        let group = self.load(group_id)?;
        if group.expense(expense_id).is_none() {
            return Err(Error::not_found(format!("expense {}", expense_id)).into());
        }

        let mut expense = Self::build_expense(&group, input)?;
        expense.id = expense_id.to_string();
        self.repository.update_expense(&group.id, &expense)?;
        Ok(expense)
    }

    pub fn delete_expense(&self, group_id: &str, expense_id: &str) -> Result<()> {
        Ok(self.repository.delete_expense(group_id, expense_id)?)
    }

    /// Resolve a member by id or case-insensitive name
    pub fn resolve_member<'a>(group: &'a Group, key: &str) -> Result<&'a Member> {
        if let Some(member) = group.member(key) {
            return Ok(member);
        }

        let wanted = key.trim().to_lowercase();
        let matches: Vec<&Member> = group
            .members
            .iter()
            .filter(|m| m.name.to_lowercase() == wanted)
            .collect();

        match matches.as_slice() {
            [] => Err(anyhow!("No member '{}' in group {}", key, group.name)),
            [member] => Ok(*member),
            _ => Err(anyhow!(
                "Several members of {} are named '{}'; use the member id instead",
                group.name,
                key
            )),
        }
    }

    fn load(&self, group_id: &str) -> Result<Group> {
        self.repository
            .get_group(group_id)?
            .ok_or_else(|| Error::not_found(format!("group {}", group_id)).into())
    }

    fn build_expense(group: &Group, input: ExpenseInput) -> Result<Expense> {
        if group.member(&input.paid_by).is_none() {
            bail!("Payer {} is not a member of {}", input.paid_by, group.name);
        }
        if let SplitRequest::Select { member_ids } = &input.split {
            if let Some(unknown) = member_ids.iter().find(|id| group.member(id).is_none()) {
                bail!("{} is not a member of {}", unknown, group.name);
            }
        }

        let splits = build_splits(input.amount, &input.split, &group.members)?;
        let expense = Expense::new(
            input.description.trim(),
            input.amount,
            input.date,
            input.paid_by,
            input.split.split_type(),
            splits,
        );
        expense.validate().map_err(Error::validation)?;
        Ok(expense)
    }
}
