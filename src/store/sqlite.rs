use rusqlite::{Connection, OpenFlags};

pub fn init_sqlite_connection(path: &str) -> Result<Connection, String> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
    );
    match conn {
        Ok(conn) => match conn.query_row("PRAGMA journal_mode=WAL;", [], |_row| Ok(())) {
            Ok(_) => Ok(conn),
            Err(e) => Err(format!("fail to execute PRAGMA journal_mode=WAL. {}", e)),
        },
        Err(e) => Err(format!("fail to open sqlite file {}. {}", path, e)),
    }
}

/// Reports whether a table called `name` exists. Table names are case-insensitive.
pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup_ignores_case() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!table_exists(&conn, "tickers").unwrap());

        conn.execute_batch("CREATE TABLE Tickers (symbol TEXT);").unwrap();
        assert!(table_exists(&conn, "tickers").unwrap());
        assert!(table_exists(&conn, "TICKERS").unwrap());
        assert!(!table_exists(&conn, "ticker").unwrap());
    }
}
