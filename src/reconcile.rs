use rusqlite::Connection;

use crate::{constants, model, store::stock_data};

// NaN and infinities become NULL.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Canonical stored form of a ticker: trimmed and upper-cased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Maps a provider bar onto the stored row for `symbol`.
pub fn normalize(symbol: &str, raw: &model::RawBar) -> model::PriceBar {
    model::PriceBar {
        symbol: normalize_symbol(symbol),
        date: raw.date.format(constants::DATE_FORMAT).to_string(),
        open: finite(raw.open),
        high: finite(raw.high),
        low: finite(raw.low),
        close: finite(raw.close),
        adj_close: finite(raw.adj_close),
        volume: finite(raw.volume),
    }
}

/// Writes fetched bars for one symbol and returns the number of rows written.
///
/// Rows are upserted by (ticker, date) in one transaction, replacing every
/// field of an existing row. Applying the same bars twice leaves the same state.
pub fn reconcile(
    conn: &mut Connection,
    symbol: &str,
    raw_bars: &[model::RawBar],
) -> model::Result<usize> {
    if raw_bars.is_empty() {
        return Ok(0);
    }
    let bars: Vec<model::PriceBar> = raw_bars.iter().map(|raw| normalize(symbol, raw)).collect();
    Ok(stock_data::save_bars(conn, &bars)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(day: u32, close: f64) -> model::RawBar {
        model::RawBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: Some(close - 1.0),
            high: Some(close + 1.0),
            low: Some(close - 2.0),
            close: Some(close),
            adj_close: Some(close),
            volume: Some(1_000.0),
        }
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        stock_data::create_table(&conn).unwrap();
        conn
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let mut conn = setup();
        assert_eq!(reconcile(&mut conn, "AAA", &[]).unwrap(), 0);
        assert!(stock_data::get_bars(&conn, "AAA").unwrap().is_empty());
    }

    #[test]
    fn reconciling_twice_is_idempotent() {
        let mut conn = setup();
        let bars: Vec<_> = (2..=6).map(|d| raw(d, 10.0 + d as f64)).collect();

        assert_eq!(reconcile(&mut conn, "aaa ", &bars).unwrap(), 5);
        let first = stock_data::get_bars(&conn, "AAA").unwrap();
        assert_eq!(reconcile(&mut conn, "AAA", &bars).unwrap(), 5);
        let second = stock_data::get_bars(&conn, "AAA").unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        assert_eq!(first[0].date, "2024-01-02");
    }

    #[test]
    fn overlapping_fetch_replaces_whole_row() {
        let mut conn = setup();
        reconcile(&mut conn, "AAA", &[raw(2, 10.0), raw(3, 11.0)]).unwrap();

        let mut revised = raw(3, 20.0);
        revised.volume = None;
        reconcile(&mut conn, "AAA", &[revised, raw(4, 12.0)]).unwrap();

        let rows = stock_data::get_bars(&conn, "AAA").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].close, Some(20.0));
        assert_eq!(rows[1].volume, None);
    }

    #[test]
    fn not_a_number_is_stored_as_null() {
        let mut conn = setup();
        let mut bar = raw(2, 10.0);
        bar.adj_close = Some(f64::NAN);
        bar.high = Some(f64::INFINITY);
        bar.low = None;
        reconcile(&mut conn, "AAA", &[bar]).unwrap();

        let (adj_close, high, low, adj_type): (Option<f64>, Option<f64>, Option<f64>, String) =
            conn.query_row(
                "SELECT adj_close, high, low, typeof(adj_close) FROM stock_data WHERE ticker = 'AAA'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(adj_close, None);
        assert_eq!(high, None);
        assert_eq!(low, None);
        assert_eq!(adj_type, "null");
    }

    #[test]
    fn failing_batch_rolls_back_entirely() {
        let mut conn = setup();
        conn.execute_batch(
            "CREATE TRIGGER reject_day BEFORE INSERT ON stock_data
             WHEN NEW.date = '2024-01-04'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

        let bars: Vec<_> = (2..=6).map(|d| raw(d, 10.0)).collect();
        assert!(matches!(
            reconcile(&mut conn, "AAA", &bars),
            Err(model::SyncError::DatabaseError(_))
        ));
        assert!(stock_data::get_bars(&conn, "AAA").unwrap().is_empty());
    }

    #[test]
    fn symbols_never_share_rows() {
        let mut conn = setup();
        reconcile(&mut conn, "AAA", &[raw(2, 10.0)]).unwrap();
        reconcile(&mut conn, "BBB", &[raw(2, 50.0)]).unwrap();

        assert_eq!(stock_data::get_bars(&conn, "AAA").unwrap()[0].close, Some(10.0));
        assert_eq!(stock_data::get_bars(&conn, "BBB").unwrap()[0].close, Some(50.0));
    }
}
