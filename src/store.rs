// Store - shared handle over the SQLite connection
//
// One connection behind a mutex; every entity call runs as a single
// statement on it. Entity functions speak `anyhow`, callers of the store get
// a `StoreError` they can match on.

use crate::db;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: connection lock poisoned")]
    Unavailable,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (and initialize) a database file
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = db::open_database(path)?;
        db::setup_database(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(anyhow::Error::from)?;
        db::setup_database(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Store {
            conn: Mutex::new(conn),
        }
    }

    /// Run `f` with exclusive access to the connection
    pub fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> anyhow::Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(f(&conn)?)
    }
}
