// 🗄️ Database - SQLite schema for the office hierarchy
// Office → Program → Plan → Record, plus Beneficiary and User

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Tables in parent-to-child order
pub const TABLES: [&str; 6] = [
    "offices",
    "programs",
    "beneficiaries",
    "plans",
    "records",
    "users",
];

/// Open a database file and enable foreign keys on the connection
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    enable_foreign_keys(&conn)?;
    Ok(conn)
}

/// Foreign keys are per-connection in SQLite, cascades depend on this
pub fn enable_foreign_keys(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("Failed to enable foreign keys")?;
    Ok(())
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases stay "memory")
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    enable_foreign_keys(conn)?;

    // ==========================================================================
    // Hierarchy tables (every child cascades with its parent)
    // ==========================================================================
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS offices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS programs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            office_id INTEGER NOT NULL REFERENCES offices(id) ON DELETE CASCADE,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS beneficiaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            program_id INTEGER NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            program_id INTEGER NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            plan_id INTEGER NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
            beneficiary_id INTEGER NOT NULL REFERENCES beneficiaries(id) ON DELETE CASCADE,
            name TEXT NOT NULL
        );",
    )
    .context("Failed to create hierarchy tables")?;

    // ==========================================================================
    // Users (read-only over HTTP)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            email TEXT NOT NULL DEFAULT '',
            date_joined TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_programs_office ON programs(office_id);
         CREATE INDEX IF NOT EXISTS idx_beneficiaries_program ON beneficiaries(program_id);
         CREATE INDEX IF NOT EXISTS idx_plans_program ON plans(program_id);
         CREATE INDEX IF NOT EXISTS idx_records_plan ON records(plan_id);
         CREATE INDEX IF NOT EXISTS idx_records_beneficiary ON records(beneficiary_id);
         CREATE INDEX IF NOT EXISTS idx_users_date_joined ON users(date_joined);",
    )?;

    Ok(())
}

/// Row count for one of the known tables
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    anyhow::ensure!(TABLES.contains(&table), "unknown table: {}", table);

    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;

    Ok(count)
}

/// Row counts for every table, in hierarchy order
pub fn table_counts(conn: &Connection) -> Result<Vec<(&'static str, i64)>> {
    TABLES
        .iter()
        .map(|table| Ok((*table, count_rows(conn, table)?)))
        .collect()
}

/// "?1, ?2, ..." starting after `offset` bound parameters
pub(crate) fn placeholders(offset: usize, count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{}", offset + i))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
pub(crate) fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    setup_database(&conn).unwrap();
    conn
}
