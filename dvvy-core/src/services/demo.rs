//! Demo service - manage demo mode
//!
//! Demo mode switches the CLI to a separate `demo.duckdb` seeded with a sample
//! trip, so the real groups database is never touched.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::adapters::demo::generate_demo_group;
use crate::adapters::duckdb::DuckDbRepository;
use crate::config::Config;
use crate::ports::GroupRepository;

const DEMO_DB: &str = "demo.duckdb";
const DEMO_WAL: &str = "demo.duckdb.wal";

/// Demo service for managing demo mode
pub struct DemoService {
    dvvy_dir: PathBuf,
}

impl DemoService {
    pub fn new(dvvy_dir: &Path) -> Self {
        Self {
            dvvy_dir: dvvy_dir.to_path_buf(),
        }
    }

    /// Check if demo mode is currently enabled
    pub fn is_enabled(&self) -> Result<bool> {
        let config = Config::load(&self.dvvy_dir)?;
        Ok(config.demo_mode)
    }

    /// Enable demo mode
    ///
    /// Recreates the demo database from scratch, then flips the setting.
    pub fn enable(&self) -> Result<()> {
        self.remove_demo_database()?;

        let repository = DuckDbRepository::new(&self.dvvy_dir.join(DEMO_DB))?;
        repository.ensure_schema()?;
        repository.create_group(&generate_demo_group()?)?;
        drop(repository);

        let mut config = Config::load(&self.dvvy_dir).unwrap_or_default();
        config.enable_demo_mode();
        config.save(&self.dvvy_dir)?;

        Ok(())
    }

    /// Disable demo mode, optionally deleting the demo database
    pub fn disable(&self, clean: bool) -> Result<()> {
        let mut config = Config::load(&self.dvvy_dir).unwrap_or_default();
        config.disable_demo_mode();
        config.save(&self.dvvy_dir)?;

        if clean {
            self.remove_demo_database()?;
        }

        Ok(())
    }

    fn remove_demo_database(&self) -> Result<()> {
        for file in [DEMO_DB, DEMO_WAL] {
            let path = self.dvvy_dir.join(file);
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
