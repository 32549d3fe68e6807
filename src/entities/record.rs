// 🧾 Record Entity - belongs to a Plan, references a Beneficiary
//
// Lookups always go through the plan's program so a record can never be
// reached through a program it does not belong to.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub plan_id: i64,
    pub beneficiary_id: i64,
    pub name: String,
}

impl Record {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Record {
            id: row.get(0)?,
            plan_id: row.get(1)?,
            beneficiary_id: row.get(2)?,
            name: row.get(3)?,
        })
    }
}

pub fn insert_record(
    conn: &Connection,
    plan_id: i64,
    beneficiary_id: i64,
    name: &str,
) -> Result<Record> {
    conn.execute(
        "INSERT INTO records (plan_id, beneficiary_id, name) VALUES (?1, ?2, ?3)",
        params![plan_id, beneficiary_id, name],
    )
    .with_context(|| format!("Failed to insert record under plan {}", plan_id))?;

    Ok(Record {
        id: conn.last_insert_rowid(),
        plan_id,
        beneficiary_id,
        name: name.to_string(),
    })
}

/// Records of one plan, restricted to plans of `program_id`
pub fn list_records(conn: &Connection, program_id: i64, plan_id: i64) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.plan_id, r.beneficiary_id, r.name
         FROM records r
         JOIN plans p ON p.id = r.plan_id
         WHERE p.program_id = ?1 AND r.plan_id = ?2
         ORDER BY r.id",
    )?;

    let records = stmt
        .query_map(params![program_id, plan_id], Record::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

pub fn get_record_in_plan(
    conn: &Connection,
    program_id: i64,
    plan_id: i64,
    id: i64,
) -> Result<Option<Record>> {
    let record = conn
        .query_row(
            "SELECT r.id, r.plan_id, r.beneficiary_id, r.name
             FROM records r
             JOIN plans p ON p.id = r.plan_id
             WHERE r.id = ?1 AND r.plan_id = ?2 AND p.program_id = ?3",
            params![id, plan_id, program_id],
            Record::from_row,
        )
        .optional()?;

    Ok(record)
}

pub fn update_record(conn: &Connection, id: i64, beneficiary_id: i64, name: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE records SET beneficiary_id = ?1, name = ?2 WHERE id = ?3",
        params![beneficiary_id, name, id],
    )?;
    Ok(changed > 0)
}

pub fn delete_record(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM records WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}
