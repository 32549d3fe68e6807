// 👤 User accounts - created from the CLI, read-only over HTTP

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let joined: String = row.get(3)?;
        let date_joined = DateTime::parse_from_rfc3339(&joined)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
            })?
            .with_timezone(&Utc);

        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            date_joined,
        })
    }
}

pub fn insert_user(
    conn: &Connection,
    username: &str,
    email: &str,
    date_joined: DateTime<Utc>,
) -> Result<User> {
    conn.execute(
        "INSERT INTO users (username, email, date_joined) VALUES (?1, ?2, ?3)",
        params![username, email, date_joined.to_rfc3339()],
    )
    .with_context(|| format!("Failed to insert user {}", username))?;

    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        email: email.to_string(),
        date_joined,
    })
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, username, email, date_joined FROM users WHERE id = ?1",
            params![id],
            User::from_row,
        )
        .optional()?;

    Ok(user)
}

/// Newest accounts first
pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email, date_joined FROM users
         ORDER BY date_joined DESC, id DESC",
    )?;

    let users = stmt
        .query_map([], User::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(users)
}
