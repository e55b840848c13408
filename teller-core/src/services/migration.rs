//! Schema migrations for teller.duckdb and logs.duckdb
//!
//! A migration set is an ordered list of embedded SQL files whose first entry
//! creates `sys_migrations`. Each file runs once and is recorded there by name.

use anyhow::Result;
use duckdb::Connection;

use crate::log_migrations::LOG_MIGRATIONS;
use crate::migrations::MIGRATIONS;

/// (file name, SQL) pairs in application order
pub type MigrationSet = &'static [(&'static str, &'static str)];

/// What a run changed
#[derive(Debug, Default)]
pub struct MigrationResult {
    pub applied: Vec<String>,
    pub already_applied: usize,
}

/// Applies one migration set to one connection
pub struct MigrationService<'a> {
    conn: &'a Connection,
    set: MigrationSet,
}

impl<'a> MigrationService<'a> {
    pub fn new(conn: &'a Connection, set: MigrationSet) -> Self {
        Self { conn, set }
    }

    /// The bank schema
    pub fn bank(conn: &'a Connection) -> Self {
        Self::new(conn, MIGRATIONS)
    }

    /// The event log schema
    pub fn logs(conn: &'a Connection) -> Self {
        Self::new(conn, LOG_MIGRATIONS)
    }

    /// Apply every migration of the set not yet recorded, in order
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let recorded = if self.is_tracked()? {
            self.recorded()?
        } else {
            Vec::new()
        };

        let mut result = MigrationResult::default();
        for (name, sql) in self.set {
            if recorded.iter().any(|r| r == name) {
                result.already_applied += 1;
                continue;
            }
            self.conn.execute_batch(sql)?;
            self.conn
                .execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])?;
            result.applied.push(name.to_string());
        }
        Ok(result)
    }

    fn is_tracked(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn recorded(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT migration_name FROM sys_migrations")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(names)
    }
}
