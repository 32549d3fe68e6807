// 🏢 Office Entity - root of the hierarchy
//
// Deleting an office removes its programs, and through them every
// beneficiary, plan and record below it.

use crate::db::placeholders;
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Office {
    pub id: i64,
    pub name: String,
}

impl Office {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Office {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

pub fn insert_office(conn: &Connection, name: &str) -> Result<Office> {
    conn.execute("INSERT INTO offices (name) VALUES (?1)", params![name])
        .context("Failed to insert office")?;

    Ok(Office {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub fn get_office(conn: &Connection, id: i64) -> Result<Option<Office>> {
    let office = conn
        .query_row(
            "SELECT id, name FROM offices WHERE id = ?1",
            params![id],
            Office::from_row,
        )
        .optional()?;

    Ok(office)
}

/// Offices whose id is in `ids`, ordered by id
pub fn list_offices_in(conn: &Connection, ids: &[i64]) -> Result<Vec<Office>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT id, name FROM offices WHERE id IN ({}) ORDER BY id",
        placeholders(0, ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;

    let offices = stmt
        .query_map(params_from_iter(ids.iter()), Office::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(offices)
}

/// Returns false when no office has this id
pub fn rename_office(conn: &Connection, id: i64, name: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE offices SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    Ok(changed > 0)
}

pub fn delete_office(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM offices WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_rows, test_connection};
    use crate::entities::{beneficiary, plan, program, record};

    #[test]
    fn test_insert_and_get() {
        let conn = test_connection();
        let office = insert_office(&conn, "Head Office").unwrap();

        assert_eq!(office.id, 1);
        assert_eq!(get_office(&conn, office.id).unwrap(), Some(office));
        assert_eq!(get_office(&conn, 99).unwrap(), None);
    }

    #[test]
    fn test_list_restricted_to_ids() {
        let conn = test_connection();
        for name in ["One", "Two", "Three"] {
            insert_office(&conn, name).unwrap();
        }

        let names: Vec<String> = list_offices_in(&conn, &[3, 1])
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();

        assert_eq!(names, vec!["One", "Three"]);
        assert!(list_offices_in(&conn, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_rename_missing_office() {
        let conn = test_connection();
        assert!(!rename_office(&conn, 7, "Nowhere").unwrap());
    }

    #[test]
    fn test_delete_cascades_through_hierarchy() {
        let conn = test_connection();
        let office = insert_office(&conn, "Head Office").unwrap();
        let other = insert_office(&conn, "Branch").unwrap();

        let prog = program::insert_program(&conn, office.id, "Food").unwrap();
        let kept = program::insert_program(&conn, other.id, "Water").unwrap();
        let p = plan::insert_plan(&conn, prog.id, "2025").unwrap();
        let b = beneficiary::insert_beneficiary(&conn, prog.id, "Ana").unwrap();
        record::insert_record(&conn, p.id, b.id, "Visit").unwrap();

        assert!(delete_office(&conn, office.id).unwrap());

        assert_eq!(count_rows(&conn, "offices").unwrap(), 1);
        assert_eq!(count_rows(&conn, "programs").unwrap(), 1);
        assert_eq!(count_rows(&conn, "plans").unwrap(), 0);
        assert_eq!(count_rows(&conn, "beneficiaries").unwrap(), 0);
        assert_eq!(count_rows(&conn, "records").unwrap(), 0);
        assert!(program::get_program(&conn, kept.id).unwrap().is_some());
    }
}
