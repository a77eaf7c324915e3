//! Calculation history persistence.
//!
//! The service only talks to the [`HistoryStore`] trait. `main` decides which
//! implementation to build and owns its lifetime.

use calculator_core::{HistoryRecord, Mode, NewCalculation};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Path that selects a throwaway in-memory database.
pub const IN_MEMORY: &str = ":memory:";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS calculations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        expression TEXT NOT NULL,
        result TEXT NOT NULL,
        mode TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_calculations_created_at ON calculations (created_at);
";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History store lock poisoned")]
    Poisoned,

    #[error("Unknown mode '{0}' in history row")]
    InvalidMode(String),

    #[error("History store unavailable: {0}")]
    Unavailable(String),
}

/// Storage collaborator for calculation history.
///
/// Timestamps are Unix milliseconds. `cutoff` is the retention boundary: reads return rows
/// strictly newer than it, cleanup deletes rows at or before it.
pub trait HistoryStore: Send + Sync {
    fn store_calculation(&self, entry: &NewCalculation, created_at: i64) -> Result<(), StoreError>;

    /// Rows newer than `cutoff`, newest first, at most `limit`.
    fn get_history(&self, limit: usize, cutoff: i64) -> Result<Vec<HistoryRecord>, StoreError>;

    /// Deletes rows at or before `cutoff` and returns how many were removed.
    fn cleanup_old_calculations(&self, cutoff: i64) -> Result<usize, StoreError>;
}

/// SQLite-backed history.
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Opens (creating if needed) the database at `path`. [`IN_MEMORY`] opens a private
    /// in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if path == Path::new(IN_MEMORY) {
            return Self::open_in_memory();
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        // Avoid SQLITE_BUSY when a CLI invocation and the server share the file.
        conn.busy_timeout(std::time::Duration::from_millis(1000))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn store_calculation(&self, entry: &NewCalculation, created_at: i64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO calculations (expression, result, mode, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![entry.expression, entry.result, entry.mode.as_str(), created_at],
        )?;
        Ok(())
    }

    fn get_history(&self, limit: usize, cutoff: i64) -> Result<Vec<HistoryRecord>, StoreError> {
        let conn = self.lock()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = conn.prepare(
            "SELECT id, expression, result, mode, created_at
             FROM calculations
             WHERE created_at > ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )?;

        let rows = stmt
            .query_map(params![cutoff, limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, expression, result, mode, created_at)| {
                let mode = mode
                    .parse::<Mode>()
                    .map_err(|_| StoreError::InvalidMode(mode.clone()))?;
                Ok(HistoryRecord {
                    id,
                    expression,
                    result,
                    mode,
                    created_at,
                })
            })
            .collect()
    }

    fn cleanup_old_calculations(&self, cutoff: i64) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM calculations WHERE created_at <= ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }
}

/// Stand-in used when the configured database cannot be opened.
///
/// Calculations keep working; every history operation reports the original failure.
pub struct UnavailableHistoryStore {
    reason: String,
}

impl UnavailableHistoryStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

impl HistoryStore for UnavailableHistoryStore {
    fn store_calculation(&self, _entry: &NewCalculation, _created_at: i64) -> Result<(), StoreError> {
        Err(self.error())
    }

    fn get_history(&self, _limit: usize, _cutoff: i64) -> Result<Vec<HistoryRecord>, StoreError> {
        Err(self.error())
    }

    fn cleanup_old_calculations(&self, _cutoff: i64) -> Result<usize, StoreError> {
        Err(self.error())
    }
}
