//! dvvy core - group expense balances and settlement
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Core entities (Group, Member, Expense, Balance, Settlement)
//! - **ports**: Trait definitions for external dependencies (GroupRepository)
//! - **services**: The balance engine plus business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB, demo data)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use ports::GroupRepository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Balance, Expense, Group, Member, PairwiseTab, Settlement, Split, SplitType};
pub use services::{calculate_balances, simplify_debts};

/// Main context for dvvy operations
///
/// Holds the configuration, the open groups database and the services
/// built on top of it.
pub struct DvvyContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub group_service: GroupService,
    pub summary_service: SummaryService,
    pub import_service: ImportService,
    pub status_service: StatusService,
}

impl DvvyContext {
    /// Open the database selected by the config in `dvvy_dir`
    pub fn new(dvvy_dir: &Path) -> Result<Self> {
        let config = Config::load(dvvy_dir)?;

        let db_path = dvvy_dir.join(config.db_filename());
        let repository = Arc::new(DuckDbRepository::new(&db_path)?);
        repository.ensure_schema()?;

        let port: Arc<dyn GroupRepository> = repository.clone();
        let group_service = GroupService::new(Arc::clone(&port));
        let summary_service = SummaryService::new(Arc::clone(&port));
        let import_service = ImportService::new(port);
        let status_service = StatusService::new(Arc::clone(&repository));

        Ok(Self {
            config,
            repository,
            group_service,
            summary_service,
            import_service,
            status_service,
        })
    }
}
