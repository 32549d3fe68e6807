// 🙋 Beneficiary Entity - belongs to exactly one Program, referenced by Records

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub id: i64,
    pub program_id: i64,
    pub name: String,
}

impl Beneficiary {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Beneficiary {
            id: row.get(0)?,
            program_id: row.get(1)?,
            name: row.get(2)?,
        })
    }
}

pub fn insert_beneficiary(conn: &Connection, program_id: i64, name: &str) -> Result<Beneficiary> {
    conn.execute(
        "INSERT INTO beneficiaries (program_id, name) VALUES (?1, ?2)",
        params![program_id, name],
    )
    .with_context(|| format!("Failed to insert beneficiary under program {}", program_id))?;

    Ok(Beneficiary {
        id: conn.last_insert_rowid(),
        program_id,
        name: name.to_string(),
    })
}

pub fn get_beneficiary_in_program(
    conn: &Connection,
    program_id: i64,
    id: i64,
) -> Result<Option<Beneficiary>> {
    let beneficiary = conn
        .query_row(
            "SELECT id, program_id, name FROM beneficiaries WHERE id = ?1 AND program_id = ?2",
            params![id, program_id],
            Beneficiary::from_row,
        )
        .optional()?;

    Ok(beneficiary)
}

pub fn list_beneficiaries(conn: &Connection, program_id: i64) -> Result<Vec<Beneficiary>> {
    let mut stmt = conn.prepare(
        "SELECT id, program_id, name FROM beneficiaries
         WHERE program_id = ?1
         ORDER BY id",
    )?;

    let beneficiaries = stmt
        .query_map(params![program_id], Beneficiary::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(beneficiaries)
}

pub fn rename_beneficiary(conn: &Connection, id: i64, name: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE beneficiaries SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    Ok(changed > 0)
}

/// Also deletes every record that references the beneficiary
pub fn delete_beneficiary(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM beneficiaries WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}
