use rusqlite::{Connection, Result};

/// Removes `symbols` from the tracked-symbols table in one transaction.
///
/// Returns the symbols that actually had a row deleted. `table` must already
/// be a validated identifier.
pub fn remove_symbols(conn: &mut Connection, table: &str, symbols: &[String]) -> Result<Vec<String>> {
    let transaction = conn.transaction()?;
    let mut removed = Vec::new();
    {
        let mut stmt = transaction.prepare(&format!("DELETE FROM {} WHERE symbol = ?1", table))?;
        for symbol in symbols {
            if stmt.execute([symbol])? > 0 {
                log::info!("Deleted {} from {} table", symbol, table);
                removed.push(symbol.clone());
            }
        }
    }
    transaction.commit()?;
    Ok(removed)
}
