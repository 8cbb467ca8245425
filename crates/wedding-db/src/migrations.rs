use anyhow::{Result, bail};
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (guests + wishes)");
        migrate_v1(conn)?;
    }
    if version < 2 {
        info!("Running migration v2 (guests.isHide)");
        migrate_v2(conn)?;
    }
    if version < 3 {
        info!("Running migration v3 (unique guest names and tokens)");
        migrate_v3(conn)?;
    }

    info!("Database migrations complete");
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE guests (
            id          INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            link_hash   TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_guests_name ON guests(name);
        CREATE INDEX idx_guests_link_hash ON guests(link_hash);

        CREATE TABLE wishes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_name TEXT NOT NULL,
            attendance  TEXT,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX idx_wishes_created ON wishes(created_at);

        INSERT INTO schema_version (version) VALUES (1);
        ",
    )?;
    Ok(())
}

/// No column default: rows that predate the flag read back as NULL.
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        ALTER TABLE guests ADD COLUMN isHide INTEGER;

        INSERT INTO schema_version (version) VALUES (2);
        ",
    )?;
    Ok(())
}

fn migrate_v3(conn: &Connection) -> Result<()> {
    let duplicate_names: i64 = conn.query_row(
        "SELECT COUNT(*) FROM (SELECT name FROM guests GROUP BY name HAVING COUNT(*) > 1)",
        [],
        |r| r.get(0),
    )?;
    let duplicate_tokens: i64 = conn.query_row(
        "SELECT COUNT(*) FROM (SELECT link_hash FROM guests GROUP BY link_hash HAVING COUNT(*) > 1)",
        [],
        |r| r.get(0),
    )?;
    if duplicate_names > 0 || duplicate_tokens > 0 {
        bail!(
            "cannot enforce unique guests: {} duplicated names and {} duplicated link tokens \
             must be merged by hand first",
            duplicate_names,
            duplicate_tokens
        );
    }

    conn.execute_batch(
        "
        DROP INDEX IF EXISTS idx_guests_name;
        DROP INDEX IF EXISTS idx_guests_link_hash;

        CREATE UNIQUE INDEX idx_guests_name ON guests(name);
        CREATE UNIQUE INDEX idx_guests_link_hash ON guests(link_hash);

        INSERT INTO schema_version (version) VALUES (3);
        ",
    )?;
    Ok(())
}
