use chrono::NaiveDate;
use rusqlite::Connection;

use crate::{
    model, planner,
    store::{sqlite, stock_data, tickers},
};

/// A symbol whose newest stored bar is past the staleness threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct StaleSymbol {
    pub symbol: String,
    pub last_date: NaiveDate,
    pub days_since_update: i64,
}

#[derive(Debug, Default, PartialEq)]
pub struct SweepReport {
    pub abandoned: Vec<StaleSymbol>,
    pub removed: Vec<String>, // Symbols deleted from the tracked table.
    pub tracked_table_found: bool,
}

// Table names cannot be bound as parameters, so only plain identifiers are accepted.
fn validate_table_name(name: &str) -> model::Result<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(model::SyncError::InvalidTableName(name.into()))
    }
}

/// Lists symbols whose newest stored bar is more than `abandon_days` old.
pub fn find_stale(
    conn: &Connection,
    today: NaiveDate,
    abandon_days: i64,
) -> model::Result<Vec<StaleSymbol>> {
    let mut stale = Vec::new();
    for (symbol, last) in stock_data::latest_dates(conn)? {
        let last_date = match planner::parse_stored_date(&symbol, &last) {
            Ok(date) => date,
            Err(err) => {
                log::warn!("Skipping {}: {}", symbol, err);
                continue;
            }
        };
        let days_since_update = (today - last_date).num_days();
        if days_since_update > abandon_days {
            stale.push(StaleSymbol {
                symbol,
                last_date,
                days_since_update,
            });
        }
    }
    Ok(stale)
}

/// Revokes tracking of stale symbols. Stored bars are left untouched.
///
/// When `tracked_table` does not exist the stale symbols are still reported
/// but nothing is removed.
pub fn sweep(
    conn: &mut Connection,
    today: NaiveDate,
    abandon_days: i64,
    tracked_table: &str,
) -> model::Result<SweepReport> {
    validate_table_name(tracked_table)?;
    stock_data::create_table(conn)?;

    let abandoned = find_stale(conn, today, abandon_days)?;
    for stale in &abandoned {
        log::info!(
            "Abandoned: {} last updated {} ({} days ago)",
            stale.symbol,
            stale.last_date,
            stale.days_since_update
        );
    }

    if !sqlite::table_exists(conn, tracked_table)? {
        log::warn!(
            "No '{}' table in database, skipping that step.",
            tracked_table
        );
        return Ok(SweepReport {
            abandoned,
            removed: Vec::new(),
            tracked_table_found: false,
        });
    }

    let symbols: Vec<String> = abandoned.iter().map(|s| s.symbol.clone()).collect();
    let removed = tickers::remove_symbols(conn, tracked_table, &symbols)?;
    Ok(SweepReport {
        abandoned,
        removed,
        tracked_table_found: true,
    })
}
