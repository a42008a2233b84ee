//! DuckDB repository implementation

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{Expense, Group, Member, Split, SplitType};
use crate::migrations::MIGRATIONS;
use crate::ports::GroupRepository;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| Error::database(format!("invalid amount '{}': {}", raw, e)))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| Error::database(format!("invalid date '{}': {}", raw, e)))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::database(format!("invalid timestamp '{}': {}", raw, e)))
}

/// Raw expense row, parsed into an [`Expense`] once splits are attached
struct ExpenseRow {
    id: String,
    description: String,
    amount: String,
    date: String,
    paid_by: String,
    split_type: String,
}

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl DuckDbRepository {
    /// Open (or create) the database at `db_path`
    ///
    /// Retries with exponential backoff when the file is locked by another
    /// process, e.g. two CLI invocations racing each other.
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: db_path.to_path_buf(),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[dvvy] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error
            .map(anyhow::Error::from)
            .unwrap_or_else(|| anyhow::anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    fn try_open_connection(db_path: &Path) -> duckdb::Result<Connection> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> anyhow::Result<MigrationResult> {
        let conn = self.conn()?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> anyhow::Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Path of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    fn group_exists(conn: &Connection, group_id: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_groups WHERE group_id = ?",
            [group_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn next_position(conn: &Connection, table: &str, group_id: &str) -> Result<i64> {
        let sql = format!(
            "SELECT CAST(COALESCE(MAX(position), -1) + 1 AS BIGINT) FROM {} WHERE group_id = ?",
            table
        );
        Ok(conn.query_row(&sql, [group_id], |row| row.get(0))?)
    }

    /// Insert a group row with its members and expenses
    fn insert_group(conn: &Connection, group: &Group) -> Result<()> {
        conn.execute(
            "INSERT INTO sys_groups (group_id, name, created_at) VALUES (?, ?, ?)",
            params![group.id, group.name, group.created_at.to_rfc3339()],
        )?;
        for (position, member) in group.members.iter().enumerate() {
            Self::insert_member(conn, &group.id, member, position as i64)?;
        }
        for (position, expense) in group.expenses.iter().enumerate() {
            Self::insert_expense(conn, &group.id, expense, position as i64)?;
        }
        Ok(())
    }

    /// Remove a group and everything under it, returning the number of group rows deleted
    fn delete_group_rows(conn: &Connection, group_id: &str) -> Result<usize> {
        // Children first, then the group itself
        conn.execute("DELETE FROM sys_splits WHERE group_id = ?", [group_id])?;
        conn.execute("DELETE FROM sys_expenses WHERE group_id = ?", [group_id])?;
        conn.execute("DELETE FROM sys_members WHERE group_id = ?", [group_id])?;
        Ok(conn.execute("DELETE FROM sys_groups WHERE group_id = ?", [group_id])?)
    }

    fn insert_member(conn: &Connection, group_id: &str, member: &Member, position: i64) -> Result<()> {
        conn.execute(
            "INSERT INTO sys_members (group_id, member_id, name, position) VALUES (?, ?, ?, ?)",
            params![group_id, member.id, member.name, position],
        )?;
        Ok(())
    }

    fn insert_expense(conn: &Connection, group_id: &str, expense: &Expense, position: i64) -> Result<()> {
        conn.execute(
            "INSERT INTO sys_expenses (group_id, expense_id, description, amount, expense_date,
                                       paid_by, split_type, position)
             VALUES (?, ?, ?, ?, CAST(? AS DATE), ?, ?, ?)",
            params![
                group_id,
                expense.id,
                expense.description,
                expense.amount.to_string(),
                expense.date.format("%Y-%m-%d").to_string(),
                expense.paid_by,
                expense.split_type.as_str(),
                position,
            ],
        )?;
        Self::insert_splits(conn, group_id, expense)
    }

    fn insert_splits(conn: &Connection, group_id: &str, expense: &Expense) -> Result<()> {
        for (position, split) in expense.splits.iter().enumerate() {
            conn.execute(
                "INSERT INTO sys_splits (group_id, expense_id, member_id, amount, position)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    group_id,
                    expense.id,
                    split.member_id,
                    split.amount.to_string(),
                    position as i64,
                ],
            )?;
        }
        Ok(())
    }

    fn load_members(conn: &Connection, group_id: &str) -> Result<Vec<Member>> {
        let mut stmt = conn.prepare(
            "SELECT member_id, name FROM sys_members WHERE group_id = ? ORDER BY position",
        )?;
        let members = stmt
            .query_map([group_id], |row| Ok(Member::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(members)
    }

    fn load_expenses(conn: &Connection, group_id: &str) -> Result<Vec<Expense>> {
        let mut split_stmt = conn.prepare(
            "SELECT expense_id, member_id, amount FROM sys_splits
             WHERE group_id = ? ORDER BY expense_id, position",
        )?;
        let split_rows = split_stmt
            .query_map([group_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut splits_by_expense: HashMap<String, Vec<Split>> = HashMap::new();
        for (expense_id, member_id, amount) in split_rows {
            splits_by_expense
                .entry(expense_id)
                .or_default()
                .push(Split::new(member_id, parse_amount(&amount)?));
        }

        let mut stmt = conn.prepare(
            "SELECT expense_id, description, amount, expense_date::VARCHAR, paid_by, split_type
             FROM sys_expenses WHERE group_id = ? ORDER BY position",
        )?;
        let rows = stmt
            .query_map([group_id], |row| {
                Ok(ExpenseRow {
                    id: row.get(0)?,
                    description: row.get(1)?,
                    amount: row.get(2)?,
                    date: row.get(3)?,
                    paid_by: row.get(4)?,
                    split_type: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| {
                let split_type = SplitType::from_str(&row.split_type).map_err(Error::database)?;
                Ok(Expense {
                    splits: splits_by_expense.remove(&row.id).unwrap_or_default(),
                    amount: parse_amount(&row.amount)?,
                    date: parse_date(&row.date)?,
                    id: row.id,
                    description: row.description,
                    paid_by: row.paid_by,
                    split_type,
                })
            })
            .collect()
    }

    fn load_group(conn: &Connection, group_id: &str, name: String, created_at: &str) -> Result<Group> {
        Ok(Group {
            id: group_id.to_string(),
            name,
            members: Self::load_members(conn, group_id)?,
            expenses: Self::load_expenses(conn, group_id)?,
            created_at: parse_timestamp(created_at)?,
        })
    }

    /// Number of stored groups, members and expenses
    pub fn counts(&self) -> Result<(i64, i64, i64)> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<i64> {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?)
        };
        Ok((count("sys_groups")?, count("sys_members")?, count("sys_expenses")?))
    }
}

impl GroupRepository for DuckDbRepository {
    fn create_group(&self, group: &Group) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        Self::insert_group(&tx, group)?;
        tx.commit()?;
        Ok(())
    }

    fn save_groups(&self, groups: &[Group]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for group in groups {
            Self::delete_group_rows(&tx, &group.id)?;
            Self::insert_group(&tx, group)?;
        }
        // Dropping the transaction on any error above rolls everything back
        tx.commit()?;
        Ok(())
    }

    fn list_groups(&self) -> Result<Vec<Group>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT group_id, name, created_at FROM sys_groups ORDER BY created_at, name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, created_at)| Self::load_group(&conn, &id, name, &created_at))
            .collect()
    }

    fn get_group(&self, group_id: &str) -> Result<Option<Group>> {
        let conn = self.conn()?;
        let row = conn.query_row(
            "SELECT name, created_at FROM sys_groups WHERE group_id = ?",
            [group_id],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        );

        match row {
            Ok((name, created_at)) => Ok(Some(Self::load_group(&conn, group_id, name, &created_at)?)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_group(&self, group_id: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        if Self::delete_group_rows(&tx, group_id)? == 0 {
            return Err(Error::not_found(format!("group {}", group_id)));
        }

        tx.commit()?;
        Ok(())
    }

    fn add_member(&self, group_id: &str, member: &Member) -> Result<()> {
        let conn = self.conn()?;
        if !Self::group_exists(&conn, group_id)? {
            return Err(Error::not_found(format!("group {}", group_id)));
        }
        let position = Self::next_position(&conn, "sys_members", group_id)?;
        Self::insert_member(&conn, group_id, member, position)
    }

    fn add_expense(&self, group_id: &str, expense: &Expense) -> Result<()> {
        let mut conn = self.conn()?;
        if !Self::group_exists(&conn, group_id)? {
            return Err(Error::not_found(format!("group {}", group_id)));
        }
        let position = Self::next_position(&conn, "sys_expenses", group_id)?;

        let tx = conn.transaction()?;
        Self::insert_expense(&tx, group_id, expense, position)?;
        tx.commit()?;
        Ok(())
    }

    fn update_expense(&self, group_id: &str, expense: &Expense) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE sys_expenses
             SET description = ?, amount = ?, expense_date = CAST(? AS DATE), paid_by = ?, split_type = ?
             WHERE group_id = ? AND expense_id = ?",
            params![
                expense.description,
                expense.amount.to_string(),
                expense.date.format("%Y-%m-%d").to_string(),
                expense.paid_by,
                expense.split_type.as_str(),
                group_id,
                expense.id,
            ],
        )?;
        if updated == 0 {
            return Err(Error::not_found(format!("expense {}", expense.id)));
        }

        tx.execute(
            "DELETE FROM sys_splits WHERE group_id = ? AND expense_id = ?",
            params![group_id, expense.id],
        )?;
        Self::insert_splits(&tx, group_id, expense)?;

        tx.commit()?;
        Ok(())
    }

    fn delete_expense(&self, group_id: &str, expense_id: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM sys_splits WHERE group_id = ? AND expense_id = ?",
            params![group_id, expense_id],
        )?;
        let deleted = tx.execute(
            "DELETE FROM sys_expenses WHERE group_id = ? AND expense_id = ?",
            params![group_id, expense_id],
        )?;
        if deleted == 0 {
            return Err(Error::not_found(format!("expense {}", expense_id)));
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable_error("IO Error: Could not set lock on file: Resource temporarily unavailable"));
        assert!(is_retryable_error("The process cannot access the file because it is being used by another process"));
        assert!(!is_retryable_error("Catalog Error: Table with name sys_groups does not exist"));
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_amount("12.50").unwrap(), Decimal::new(1250, 2));
        assert!(parse_amount("twelve").is_err());
        assert_eq!(parse_date("2024-02-29").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(parse_timestamp("yesterday").is_err());
    }
}
