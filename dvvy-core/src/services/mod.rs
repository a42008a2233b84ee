//! Service layer - business logic orchestration
//!
//! The balance engine (`balance`, `settlement`) and its companions (`split`,
//! `tabs`, `stats`) are plain functions over domain values. The remaining
//! services coordinate them with storage and configuration.

pub mod balance;
mod demo;
pub mod export;
mod group;
pub mod import;
pub mod logging;
pub mod migration;
pub mod settlement;
pub mod split;
pub mod stats;
mod status;
pub mod summary;
pub mod tabs;

pub use balance::calculate_balances;
pub use demo::DemoService;
pub use export::{ExportReport, ExportService};
pub use group::{ExpenseInput, GroupService};
pub use import::{ImportOptions, ImportResult, ImportService, ImportedGroup};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use settlement::simplify_debts;
pub use split::{build_splits, SplitRequest};
pub use stats::{ExpenseByDate, GroupStats, LargestExpense, MemberStats};
pub use status::{GroupStatus, StatusService, StatusSummary};
pub use summary::{GroupSummary, SummaryService};
pub use tabs::compute_pairwise_tabs;
