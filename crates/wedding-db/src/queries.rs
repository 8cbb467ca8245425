use crate::Database;
use crate::models::{GuestRow, WishRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

/// Result of trying to register a new guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestInsert {
    Inserted,
    /// Another row already holds this name; nothing was written.
    NameTaken,
    /// The generated link token is already in use; nothing was written.
    TokenTaken,
}

impl Database {
    // -- Guests --

    pub fn get_guest_by_name(&self, name: &str) -> Result<Option<GuestRow>> {
        self.with_conn(|conn| query_guest(conn, "name", name))
    }

    pub fn get_guest_by_link_hash(&self, link_hash: &str) -> Result<Option<GuestRow>> {
        self.with_conn(|conn| query_guest(conn, "link_hash", link_hash))
    }

    /// Insert a guest unless the name is already registered. A clash on
    /// `name` is reported as `NameTaken`, a clash on `link_hash` as
    /// `TokenTaken`; neither is an error.
    pub fn insert_guest(&self, name: &str, link_hash: &str, is_hide: bool) -> Result<GuestInsert> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO guests (name, link_hash, isHide) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO NOTHING",
                rusqlite::params![name, link_hash, is_hide],
            );

            match inserted {
                Ok(0) => Ok(GuestInsert::NameTaken),
                Ok(_) => Ok(GuestInsert::Inserted),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    Ok(GuestInsert::TokenTaken)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn count_guests(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM guests", [], |r| r.get(0))?))
    }

    // -- Wishes --

    /// Append a wish. `created_at` must be an RFC 3339 UTC timestamp so that
    /// string order matches time order. Returns the new row id.
    pub fn insert_wish(
        &self,
        sender_name: &str,
        attendance: Option<&str>,
        content: &str,
        created_at: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO wishes (sender_name, attendance, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![sender_name, attendance, content, created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Every wish, newest first.
    pub fn list_wishes(&self) -> Result<Vec<WishRow>> {
        self.with_conn(query_wishes)
    }

    pub fn count_wishes(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM wishes", [], |r| r.get(0))?))
    }
}

fn query_guest(conn: &Connection, column: &str, value: &str) -> Result<Option<GuestRow>> {
    let sql = format!(
        "SELECT id, name, link_hash, isHide, created_at FROM guests WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([value], guest_from_row).optional()?;

    Ok(row)
}

fn guest_from_row(row: &Row<'_>) -> rusqlite::Result<GuestRow> {
    Ok(GuestRow {
        id: row.get(0)?,
        name: row.get(1)?,
        link_hash: row.get(2)?,
        is_hide: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn query_wishes(conn: &Connection) -> Result<Vec<WishRow>> {
    // Row id breaks ties between wishes written in the same millisecond
    let mut stmt = conn.prepare(
        "SELECT id, sender_name, attendance, content, created_at
         FROM wishes
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(WishRow {
                id: row.get(0)?,
                sender_name: row.get(1)?,
                attendance: row.get(2)?,
                content: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn guest_lookup_by_name_and_hash() {
        let db = db();
        assert_eq!(
            db.insert_guest("Alice", "0a1b2c3d4e5f6071", true).unwrap(),
            GuestInsert::Inserted
        );

        let by_name = db.get_guest_by_name("Alice").unwrap().unwrap();
        assert_eq!(by_name.link_hash, "0a1b2c3d4e5f6071");
        assert_eq!(by_name.is_hide, Some(true));

        let by_hash = db.get_guest_by_link_hash("0a1b2c3d4e5f6071").unwrap().unwrap();
        assert_eq!(by_hash.name, "Alice");

        assert!(db.get_guest_by_name("alice").unwrap().is_none());
        assert!(db.get_guest_by_link_hash("ffffffffffffffff").unwrap().is_none());
    }

    #[test]
    fn duplicate_name_writes_nothing() {
        let db = db();
        db.insert_guest("Budi & Partner", "1111111111111111", false).unwrap();

        let second = db.insert_guest("Budi & Partner", "2222222222222222", true).unwrap();
        assert_eq!(second, GuestInsert::NameTaken);
        assert_eq!(db.count_guests().unwrap(), 1);

        let row = db.get_guest_by_name("Budi & Partner").unwrap().unwrap();
        assert_eq!(row.link_hash, "1111111111111111");
        assert_eq!(row.is_hide, Some(false));
    }

    #[test]
    fn duplicate_token_is_reported() {
        let db = db();
        db.insert_guest("Alice", "abcabcabcabcabca", false).unwrap();

        let clash = db.insert_guest("Bob", "abcabcabcabcabca", false).unwrap();
        assert_eq!(clash, GuestInsert::TokenTaken);
        assert_eq!(db.count_guests().unwrap(), 1);
        assert!(db.get_guest_by_name("Bob").unwrap().is_none());
    }

    #[test]
    fn wishes_come_back_newest_first() {
        let db = db();
        let w1 = db.insert_wish("W1", None, "first", "2026-01-01T00:00:01.000Z").unwrap();
        let w3 = db.insert_wish("W3", Some("yes"), "third", "2026-01-01T00:00:03.000Z").unwrap();
        let w2 = db.insert_wish("W2", Some("no"), "second", "2026-01-01T00:00:02.000Z").unwrap();

        let ids: Vec<i64> = db.list_wishes().unwrap().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![w3, w2, w1]);
    }

    #[test]
    fn same_timestamp_orders_by_insertion() {
        let db = db();
        let at = "2026-01-01T00:00:00.000Z";
        let first = db.insert_wish("A", None, "a", at).unwrap();
        let second = db.insert_wish("B", None, "b", at).unwrap();

        let ids: Vec<i64> = db.list_wishes().unwrap().iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![second, first]);
    }
}
