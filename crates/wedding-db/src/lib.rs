pub mod migrations;
pub mod models;
pub mod queries;

pub use queries::GuestInsert;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

const READER_POOL_SIZE: usize = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite handle with a reader/writer split: one writer connection and a
/// small round-robin pool of read-only connections.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let writer = Connection::open(path)?;

        // WAL mode for concurrent reads
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.busy_timeout(BUSY_TIMEOUT)?;

        migrations::run(&writer)?;

        let mut readers = Vec::with_capacity(READER_POOL_SIZE);
        for _ in 0..READER_POOL_SIZE {
            let conn = Connection::open_with_flags(
                path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            path.display(),
            READER_POOL_SIZE
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    /// Private in-memory database. Reads go through the writer since a
    /// second connection would see a different database.
    pub fn open_in_memory() -> Result<Self> {
        let writer = Connection::open_in_memory()?;
        migrations::run(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            reader_idx: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        if self.readers.is_empty() {
            return self.with_conn_mut(f);
        }

        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|e| anyhow::anyhow!("Reader lock poisoned: {}", e))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Writer lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Close every connection, surfacing any error SQLite reports while
    /// flushing. Readers go first so the writer can checkpoint the WAL.
    pub fn close(self) -> Result<()> {
        for reader in self.readers {
            let conn = reader
                .into_inner()
                .map_err(|e| anyhow::anyhow!("Reader lock poisoned: {}", e))?;
            conn.close().map_err(|(_, e)| e)?;
        }

        let writer = self
            .writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Writer lock poisoned: {}", e))?;
        writer.close().map_err(|(_, e)| e)?;

        info!("Database closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_database_reads_writes_through_readers_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wedding.db");

        let db = Database::open(&path).unwrap();
        assert_eq!(db.readers.len(), READER_POOL_SIZE);
        db.insert_guest("Alice", "aaaaaaaaaaaaaaaa", true).unwrap();

        // Enough lookups to visit every reader
        for _ in 0..READER_POOL_SIZE * 2 {
            let row = db.get_guest_by_link_hash("aaaaaaaaaaaaaaaa").unwrap().unwrap();
            assert_eq!(row.name, "Alice");
        }
        db.close().unwrap();

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.count_guests().unwrap(), 1);
        reopened.close().unwrap();
    }

    #[test]
    fn readers_refuse_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("wedding.db")).unwrap();

        let err = db.with_conn(|conn| {
            conn.execute("INSERT INTO guests (name, link_hash) VALUES ('x', 'y')", [])?;
            Ok(())
        });
        assert!(err.is_err());
        assert_eq!(db.count_guests().unwrap(), 0);
        db.close().unwrap();
    }
}
