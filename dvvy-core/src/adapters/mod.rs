//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the GroupRepository port
//! - A fixed demo group for demo mode

pub mod demo;
pub mod duckdb;
