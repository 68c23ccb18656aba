use rusqlite::{Connection, ErrorCode};
use std::path::{Path, PathBuf};

use crate::board::item::Item;

/// Default cap on a single container's serialized payload, in bytes.
/// Matches the ballpark quota of the browser storage the board's data
/// layout originated in.
pub const DEFAULT_CAPACITY_BYTES: usize = 5 * 1024 * 1024;

/// Errors produced by the storage layer
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A save would exceed the store's capacity. Reported distinctly so the
    /// caller can warn the user instead of silently dropping data.
    #[error("storage capacity exceeded ({payload} bytes > {capacity} byte cap)")]
    CapacityExceeded { payload: usize, capacity: usize },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt container record: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("could not create data directory: {0}")]
    Io(#[from] std::io::Error),
}

/// The ItemStore manages the SQLite database holding every container's
/// ordered item list. One row per container key; the row value is the
/// list serialized as JSON.
pub struct ItemStore {
    conn: Connection,
    db_path: PathBuf,
    capacity_bytes: usize,
}

impl ItemStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_capacity(path, DEFAULT_CAPACITY_BYTES)
    }

    /// Open with an explicit capacity cap. Tests use tiny caps to exercise
    /// the capacity-exceeded path.
    pub fn open_with_capacity(path: &Path, capacity_bytes: usize) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = ItemStore {
            conn,
            db_path: path.to_path_buf(),
            capacity_bytes,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open the store in the user's data directory:
    /// - Linux: ~/.local/share/tier-board/board.db
    /// - macOS: ~/Library/Application Support/tier-board/board.db
    /// - Windows: %APPDATA%\tier-board\board.db
    pub fn open_default() -> Result<Self, StoreError> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .expect("Could not determine user data directory");
        path.push("tier-board");
        path.push("board.db");

        let store = Self::open(&path)?;
        println!("📁 Database initialized at: {}", path.display());
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS containers (
                key         TEXT PRIMARY KEY,
                items_json  TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Load a container's ordered item list. A key that was never saved
    /// yields an empty list, not an error.
    pub fn load(&self, key: &str) -> Result<Vec<Item>, StoreError> {
        let row: Result<String, rusqlite::Error> = self.conn.query_row(
            "SELECT items_json FROM containers WHERE key = ?1",
            [key],
            |row| row.get(0),
        );

        match row {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a container's ordered item list, replacing any previous
    /// record for the key. Order is preserved exactly.
    pub fn save(&self, key: &str, items: &[Item]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items)?;

        if json.len() > self.capacity_bytes {
            return Err(StoreError::CapacityExceeded {
                payload: json.len(),
                capacity: self.capacity_bytes,
            });
        }

        let result = self.conn.execute(
            "INSERT INTO containers (key, items_json) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET items_json = excluded.items_json",
            rusqlite::params![key, json],
        );

        match result {
            Ok(_) => Ok(()),
            // A full disk or oversized row is still a capacity problem
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::DiskFull || err.code == ErrorCode::TooBig =>
            {
                Err(StoreError::CapacityExceeded {
                    payload: json.len(),
                    capacity: self.capacity_bytes,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Drop a container's record entirely (tier deletion, rename cleanup).
    /// Removing a key that does not exist is a no-op.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM containers WHERE key = ?1", [key])?;
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStore")
            .field("db_path", &self.db_path)
            .field("capacity_bytes", &self.capacity_bytes)
            .finish()
    }
}
