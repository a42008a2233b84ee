//! Status service - what is stored in the current database

use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::adapters::duckdb::DuckDbRepository;
use crate::ports::GroupRepository;
use crate::services::settlement::simplify_debts;

/// Status service for database summaries
pub struct StatusService {
    repository: Arc<DuckDbRepository>,
}

impl StatusService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self { repository }
    }

    /// Get overall status summary
    pub fn get_status(&self) -> Result<StatusSummary> {
        let (total_groups, total_members, total_expenses) = self.repository.counts()?;
        let groups = self.repository.list_groups()?;

        let summaries: Vec<GroupStatus> = groups
            .iter()
            .map(|g| GroupStatus {
                id: g.id.clone(),
                name: g.name.clone(),
                members: g.members.len(),
                expenses: g.expenses.len(),
                total_spend: g.expenses.iter().map(|e| e.amount).sum(),
                open_settlements: simplify_debts(&g.members, &g.expenses).len(),
            })
            .collect();

        Ok(StatusSummary {
            database: self.repository.db_path().display().to_string(),
            total_groups,
            total_members,
            total_expenses,
            total_spend: summaries.iter().map(|g| g.total_spend).sum(),
            groups: summaries,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub database: String,
    pub total_groups: i64,
    pub total_members: i64,
    pub total_expenses: i64,
    pub total_spend: Decimal,
    pub groups: Vec<GroupStatus>,
}

#[derive(Debug, Serialize)]
pub struct GroupStatus {
    pub id: String,
    pub name: String,
    pub members: usize,
    pub expenses: usize,
    pub total_spend: Decimal,
    pub open_settlements: usize,
}
