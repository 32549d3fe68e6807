// 📋 Program Entity - belongs to exactly one Office

use crate::db::placeholders;
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub office_id: i64,
    pub name: String,
}

impl Program {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Program {
            id: row.get(0)?,
            office_id: row.get(1)?,
            name: row.get(2)?,
        })
    }
}

pub fn insert_program(conn: &Connection, office_id: i64, name: &str) -> Result<Program> {
    conn.execute(
        "INSERT INTO programs (office_id, name) VALUES (?1, ?2)",
        params![office_id, name],
    )
    .with_context(|| format!("Failed to insert program under office {}", office_id))?;

    Ok(Program {
        id: conn.last_insert_rowid(),
        office_id,
        name: name.to_string(),
    })
}

pub fn get_program(conn: &Connection, id: i64) -> Result<Option<Program>> {
    let program = conn
        .query_row(
            "SELECT id, office_id, name FROM programs WHERE id = ?1",
            params![id],
            Program::from_row,
        )
        .optional()?;

    Ok(program)
}

/// Program `id` only if it belongs to `office_id`
pub fn get_program_in_office(conn: &Connection, office_id: i64, id: i64) -> Result<Option<Program>> {
    let program = conn
        .query_row(
            "SELECT id, office_id, name FROM programs WHERE id = ?1 AND office_id = ?2",
            params![id, office_id],
            Program::from_row,
        )
        .optional()?;

    Ok(program)
}

/// Programs of an office whose id is in `ids`, ordered by id
pub fn list_programs_in(conn: &Connection, office_id: i64, ids: &[i64]) -> Result<Vec<Program>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT id, office_id, name FROM programs
         WHERE office_id = ?1 AND id IN ({})
         ORDER BY id",
        placeholders(1, ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;

    let bound = std::iter::once(Value::Integer(office_id))
        .chain(ids.iter().map(|id| Value::Integer(*id)));

    let programs = stmt
        .query_map(params_from_iter(bound), Program::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(programs)
}

pub fn rename_program(conn: &Connection, id: i64, name: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE programs SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    Ok(changed > 0)
}

pub fn delete_program(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM programs WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}
