use chrono::NaiveDate;
use rusqlite::Connection;

use crate::{
    fetcher::Fetcher,
    model::{self, SyncDecision},
    planner, reconcile,
    store::stock_data,
};

/// Result of processing one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Updated { rows: usize },
    NoData,
    Current,
    Abandoned,
    Failed(String),
}

/// Totals for a sync run.
#[derive(Debug, Default, PartialEq)]
pub struct SyncSummary {
    pub updated: usize,
    pub rows_written: usize,
    pub no_data: usize,
    pub current: usize,
    pub abandoned: Vec<String>,
    pub failed: Vec<(String, String)>, // (symbol, reason)
}

impl SyncSummary {
    fn record(&mut self, symbol: &str, outcome: SymbolOutcome) {
        match outcome {
            SymbolOutcome::Updated { rows } => {
                self.updated += 1;
                self.rows_written += rows;
            }
            SymbolOutcome::NoData => self.no_data += 1,
            SymbolOutcome::Current => self.current += 1,
            SymbolOutcome::Abandoned => self.abandoned.push(symbol.into()),
            SymbolOutcome::Failed(reason) => self.failed.push((symbol.into(), reason)),
        }
    }
}

/// Plans, fetches and stores one symbol. Errors are returned, not logged.
async fn sync_symbol<F: Fetcher>(
    conn: &mut Connection,
    fetcher: &F,
    symbol: &str,
    today: NaiveDate,
    config: &model::SyncConfig,
) -> model::Result<SymbolOutcome> {
    let (start, end) = match planner::plan(conn, symbol, today, config)? {
        SyncDecision::SkipAbandoned { latest, days_since } => {
            log::info!(
                "[{}] Abandoned: no new data for {} days (last {}). Skipping download.",
                symbol,
                days_since,
                latest
            );
            return Ok(SymbolOutcome::Abandoned);
        }
        SyncDecision::SkipCurrent { latest } => {
            log::info!("[{}] Already up-to-date (last {}).", symbol, latest);
            return Ok(SymbolOutcome::Current);
        }
        SyncDecision::Fetch { start, end } => (start, end),
    };

    log::info!("[{}] Fetching data from {} to {}", symbol, start, end);
    let bars = fetcher.fetch(symbol, start, end).await?;
    if bars.is_empty() {
        log::info!("[{}] No new data.", symbol);
        return Ok(SymbolOutcome::NoData);
    }

    let rows = reconcile::reconcile(conn, symbol, &bars)?;
    log::info!("[{}] Added/updated {} rows.", symbol, rows);
    Ok(SymbolOutcome::Updated { rows })
}

/// Brings stored history for every symbol up to `today`, one symbol at a time.
///
/// A failure for one symbol is logged and recorded in the summary; the batch
/// carries on with the next symbol.
pub async fn pull_and_save<F: Fetcher>(
    conn: &mut Connection, // Database connection.
    fetcher: &F,           // Source of daily bars.
    symbols: &[String],    // Tickers, normalized here before use.
    today: NaiveDate,
    config: &model::SyncConfig,
) -> model::Result<SyncSummary> {
    // Initialize the stock_data table in the database.
    stock_data::create_table(conn)?;

    let mut summary = SyncSummary::default();
    for (i, symbol) in symbols.iter().enumerate() {
        // Plan, fetch and store all use the stored form of the ticker.
        let symbol = reconcile::normalize_symbol(symbol);
        log::debug!("[{}/{}] {}", i + 1, symbols.len(), symbol);
        if symbol.is_empty() {
            summary.record(&symbol, SymbolOutcome::Failed("empty symbol".into()));
            continue;
        }
        let outcome = match sync_symbol(conn, fetcher, &symbol, today, config).await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::error!("[{}] Failed, continuing: {}", symbol, err);
                SymbolOutcome::Failed(err.to_string())
            }
        };
        summary.record(&symbol, outcome);
    }
    Ok(summary)
}
