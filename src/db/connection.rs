//! SQLite connection management for staged proton.db copies.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

/// Open a read-only connection to a staged database.
///
/// Reads the schema version once so a file that only looks like SQLite
/// fails here rather than on the first table query.
pub fn open_staged(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_staged_valid_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE label (Name TEXT, Color TEXT);")
                .unwrap();
        }

        let conn = open_staged(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM label", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_open_staged_corrupt_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2.db");
        let mut bytes = b"SQLite format 3\0".to_vec();
        bytes.extend(std::iter::repeat(0xAB).take(200));
        std::fs::write(&path, bytes).unwrap();

        assert!(open_staged(&path).is_err());
    }
}
