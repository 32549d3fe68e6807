// 🗓️ Plan Entity - belongs to exactly one Program

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub program_id: i64,
    pub name: String,
}

impl Plan {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Plan {
            id: row.get(0)?,
            program_id: row.get(1)?,
            name: row.get(2)?,
        })
    }

    /// Approval has no side effects yet; it only leaves a trace.
    pub fn approve(&self) {
        tracing::info!(plan_id = self.id, program_id = self.program_id, "plan approved");
    }
}

pub fn insert_plan(conn: &Connection, program_id: i64, name: &str) -> Result<Plan> {
    conn.execute(
        "INSERT INTO plans (program_id, name) VALUES (?1, ?2)",
        params![program_id, name],
    )
    .with_context(|| format!("Failed to insert plan under program {}", program_id))?;

    Ok(Plan {
        id: conn.last_insert_rowid(),
        program_id,
        name: name.to_string(),
    })
}

/// Plan `id` only if it belongs to `program_id`
pub fn get_plan_in_program(conn: &Connection, program_id: i64, id: i64) -> Result<Option<Plan>> {
    let plan = conn
        .query_row(
            "SELECT id, program_id, name FROM plans WHERE id = ?1 AND program_id = ?2",
            params![id, program_id],
            Plan::from_row,
        )
        .optional()?;

    Ok(plan)
}

pub fn list_plans(conn: &Connection, program_id: i64) -> Result<Vec<Plan>> {
    let mut stmt = conn.prepare(
        "SELECT id, program_id, name FROM plans
         WHERE program_id = ?1
         ORDER BY id",
    )?;

    let plans = stmt
        .query_map(params![program_id], Plan::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(plans)
}

pub fn rename_plan(conn: &Connection, id: i64, name: &str) -> Result<bool> {
    let changed = conn.execute("UPDATE plans SET name = ?1 WHERE id = ?2", params![name, id])?;
    Ok(changed > 0)
}

pub fn delete_plan(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM plans WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}
