/// Years of history pulled for a symbol with no stored rows.
pub const HISTORY_YEARS: u32 = 20;

/// Symbols whose newest stored bar is older than this many days are abandoned.
pub const ABANDON_DAYS: i64 = 180;

pub const DEFAULT_DB_PATH: &str = "stock_data.db";
pub const DEFAULT_TICKERS_CSV: &str = "tickers/manually_add_ticker.csv";

/// Auxiliary table listing the symbols under active tracking.
pub const TRACKED_SYMBOLS_TABLE: &str = "tickers";

/// Accepted header names for the symbol column, tried in order.
pub const SYMBOL_COLUMN_ALIASES: [&str; 2] = ["Ticker", "symbol"];

pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Canonical text form of `stock_data.date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
