use chrono::NaiveDate;
use thiserror::Error;

use crate::{constants, http::client};

/// Daily bar as returned by a provider, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>, // Some providers report volume as a float.
}

/// Structure representing one stored row of `stock_data`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub symbol: String, // Uppercase ticker.
    pub date: String,   // YYYY-MM-DD.
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

/// What the planner wants done for a single symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Fetch bars for the inclusive range `[start, end]`.
    Fetch { start: NaiveDate, end: NaiveDate },
    /// Stored history already reaches today.
    SkipCurrent { latest: NaiveDate },
    /// Stored history stopped advancing too long ago; the ticker is considered dead.
    SkipAbandoned { latest: NaiveDate, days_since: i64 },
}

#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    pub history_years: u32, // Depth of the first download for a new symbol.
    pub abandon_days: i64,  // Staleness threshold, strictly-greater-than.
}

impl SyncConfig {
    /// Full-history window in days. A year counts as 365 days.
    pub fn history_days(&self) -> u64 {
        u64::from(self.history_years) * 365
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            history_years: constants::HISTORY_YEARS,
            abandon_days: constants::ABANDON_DAYS,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("symbols file not found: {0}")]
    FileNotFound(String),
    #[error("no symbol column in {path} (expected one of {expected:?})")]
    MissingSymbolColumn {
        path: String,
        expected: &'static [&'static str],
    },
    #[error("no symbols found in {0}")]
    EmptySymbolFile(String),
    #[error("csv error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("fetch error: {0}")]
    HttpError(#[from] client::RequestError),
    #[error("invalid date '{value}' stored for {symbol}")]
    InvalidStoredDate { symbol: String, value: String },
    #[error("invalid table name: {0}")]
    InvalidTableName(String),
    #[error("{0}")]
    Config(String),
}
