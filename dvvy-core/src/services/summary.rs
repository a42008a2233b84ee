//! Summary service - everything the balance sheet shows for one group

use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::domain::{Balance, Group, PairwiseTab, Settlement};
use crate::ports::GroupRepository;
use crate::services::balance::calculate_balances;
use crate::services::settlement::simplify_debts;
use crate::services::stats::{
    compute_expense_timeline, compute_group_stats, compute_member_stats, ExpenseByDate,
    GroupStats, MemberStats,
};
use crate::services::tabs::compute_pairwise_tabs;

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub group_id: String,
    pub group_name: String,
    pub balances: Vec<Balance>,
    pub settlements: Vec<Settlement>,
    pub tabs: Vec<PairwiseTab>,
    pub group_stats: GroupStats,
    pub member_stats: Vec<MemberStats>,
    pub timeline: Vec<ExpenseByDate>,
}

impl GroupSummary {
    /// True when nobody owes anybody
    pub fn all_settled(&self) -> bool {
        self.settlements.is_empty()
    }
}

pub struct SummaryService {
    repository: Arc<dyn GroupRepository>,
}

impl SummaryService {
    pub fn new(repository: Arc<dyn GroupRepository>) -> Self {
        Self { repository }
    }

    /// Summarize a stored group
    pub fn get_summary(&self, group_id: &str) -> Result<GroupSummary> {
        let group = self
            .repository
            .get_group(group_id)?
            .ok_or_else(|| anyhow!("Group not found: {}", group_id))?;
        Ok(Self::summarize(&group))
    }

    /// Summarize an in-memory group
    pub fn summarize(group: &Group) -> GroupSummary {
        GroupSummary {
            group_id: group.id.clone(),
            group_name: group.name.clone(),
            balances: calculate_balances(&group.members, &group.expenses),
            settlements: simplify_debts(&group.members, &group.expenses),
            tabs: compute_pairwise_tabs(&group.members, &group.expenses),
            group_stats: compute_group_stats(&group.expenses),
            member_stats: compute_member_stats(&group.members, &group.expenses),
            timeline: compute_expense_timeline(&group.expenses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::demo::generate_demo_group;
    use rust_decimal::Decimal;

    #[test]
    fn test_summary_of_demo_group() {
        let group = generate_demo_group().unwrap();
        let summary = SummaryService::summarize(&group);

        assert_eq!(summary.balances.len(), group.members.len());
        assert_eq!(summary.group_stats.expense_count, group.expenses.len());
        assert!(!summary.all_settled());
        assert_eq!(summary.tabs.len(), summary.settlements.len() * 2);

        let net: Decimal = summary.balances.iter().map(|b| b.amount).sum();
        assert!(net.abs() <= Decimal::new(5, 2));
    }

    #[test]
    fn test_summary_of_empty_group() {
        let group = Group::new("Empty", vec![crate::domain::Member::new("a", "A")]);
        let summary = SummaryService::summarize(&group);
        assert!(summary.all_settled());
        assert!(summary.tabs.is_empty());
        assert!(summary.timeline.is_empty());
        assert_eq!(summary.balances[0].amount, Decimal::ZERO);
    }
}
