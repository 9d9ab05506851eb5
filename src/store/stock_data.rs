use crate::model;
use rusqlite::{params, Connection, Result};

/// Initializes the stock_data table in the SQLite database.
pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS stock_data (
            ticker TEXT,
            date TEXT,
            open REAL,
            high REAL,
            low REAL,
            close REAL,
            adj_close REAL,
            volume REAL,
            PRIMARY KEY (ticker, date)
        );",
        [],
    )?;
    Ok(())
}

/// Returns the newest stored date for `symbol`, or None when it has no rows.
pub fn latest_date(conn: &Connection, symbol: &str) -> Result<Option<String>> {
    // MAX over no rows yields a single NULL.
    conn.query_row(
        "SELECT MAX(date) FROM stock_data WHERE ticker = ?1",
        [symbol],
        |row| row.get(0),
    )
}

/// Returns (ticker, newest date) for every ticker in one pass.
pub fn latest_dates(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT ticker, MAX(date) AS last_date FROM stock_data
         WHERE ticker IS NOT NULL AND date IS NOT NULL
         GROUP BY ticker ORDER BY ticker",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

/// Saves bars with INSERT OR REPLACE inside one transaction.
///
/// Either every row is written or, on the first failure, none are.
pub fn save_bars(conn: &mut Connection, bars: &[model::PriceBar]) -> Result<usize> {
    let transaction = conn.transaction()?;
    {
        let mut stmt = transaction.prepare(
            "INSERT OR REPLACE INTO stock_data (ticker, date, open, high, low, close, adj_close, volume)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for bar in bars {
            stmt.execute(params![
                bar.symbol,
                bar.date,
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.adj_close,
                bar.volume,
            ])?;
        }
    }
    transaction.commit()?;
    Ok(bars.len())
}

/// Retrieves every stored bar for `symbol`, oldest first.
#[cfg(test)]
pub fn get_bars(conn: &Connection, symbol: &str) -> Result<Vec<model::PriceBar>> {
    let mut stmt = conn.prepare(
        "SELECT ticker, date, open, high, low, close, adj_close, volume
         FROM stock_data WHERE ticker = ?1 ORDER BY date",
    )?;
    let rows = stmt.query_map([symbol], |row| {
        Ok(model::PriceBar {
            symbol: row.get(0)?,
            date: row.get(1)?,
            open: row.get(2)?,
            high: row.get(3)?,
            low: row.get(4)?,
            close: row.get(5)?,
            adj_close: row.get(6)?,
            volume: row.get(7)?,
        })
    })?;
    rows.collect()
}
