//! Repository port - group storage abstraction

use crate::domain::result::Result;
use crate::domain::{Expense, Group, Member};

/// Storage for groups and everything inside them
///
/// Groups are always returned fully loaded, with members and expenses in the
/// order they were added.
pub trait GroupRepository: Send + Sync {
    // === Groups ===

    /// Store a new group together with its members and any expenses it already has
    fn create_group(&self, group: &Group) -> Result<()>;

    /// Store several groups in one transaction
    ///
    /// A stored group with the same id is replaced. Either every group is
    /// written or, on error, storage is left untouched.
    fn save_groups(&self, groups: &[Group]) -> Result<()>;

    /// All groups, oldest first
    fn list_groups(&self) -> Result<Vec<Group>>;

    /// Get a group by id
    fn get_group(&self, group_id: &str) -> Result<Option<Group>>;

    /// Delete a group with all its members, expenses and splits
    fn delete_group(&self, group_id: &str) -> Result<()>;

    // === Members ===

    /// Append a member to an existing group
    fn add_member(&self, group_id: &str, member: &Member) -> Result<()>;

    // === Expenses ===

    /// Append an expense to an existing group
    fn add_expense(&self, group_id: &str, expense: &Expense) -> Result<()>;

    /// Replace an existing expense (matched by id), keeping its position
    fn update_expense(&self, group_id: &str, expense: &Expense) -> Result<()>;

    /// Remove an expense and its splits
    fn delete_expense(&self, group_id: &str, expense_id: &str) -> Result<()>;
}
