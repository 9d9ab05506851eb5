// Incremental daily price history downloader.
mod yahoo {
    // Yahoo Finance chart API client.
    pub mod api_caller;
    // Response structures for the chart API.
    pub mod response;
}
// HTTP client module.
mod http {
    // HTTP client implementation.
    pub mod client;
}
// Data models and errors.
mod model;
// Source of daily bars.
mod fetcher;
// Decides what each symbol needs.
mod planner;
// Normalizes and upserts fetched bars.
mod reconcile;
// Per-symbol sync loop.
mod sync;
// Abandoned-symbol maintenance.
mod sweep;
// Symbols input file.
mod symbols;
// Data storage module.
mod store {
    /// SQLite database interaction.
    pub mod sqlite;
    /// Daily bar storage.
    pub mod stock_data;
    /// Tracked symbols list.
    pub mod tickers;
}
// module storing defaults
mod constants;

use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use dotenv::dotenv;

// Command-line argument parser.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// SQLite database file.
    #[arg(long, global = true, env = "sqlite_file", default_value = constants::DEFAULT_DB_PATH)]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

// Subcommands for the application.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Download new daily bars for every symbol in a CSV file.
    Sync {
        #[arg(long, env = "tickers_csv", default_value = constants::DEFAULT_TICKERS_CSV)]
        tickers: String,
        #[arg(long, default_value_t = constants::HISTORY_YEARS)]
        history_years: u32,
        #[arg(long, default_value_t = constants::ABANDON_DAYS)]
        abandon_days: i64,
    },
    /// Remove symbols with stale history from the tracked symbols table.
    Sweep {
        #[arg(long, default_value_t = constants::ABANDON_DAYS)]
        abandon_days: i64,
        #[arg(long, default_value = constants::TRACKED_SYMBOLS_TABLE)]
        tracked_table: String,
    },
}

fn check_abandon_days(days: i64) -> model::Result<i64> {
    if days < 0 {
        return Err(model::SyncError::Config(format!(
            "abandon days must not be negative: {days}"
        )));
    }
    Ok(days)
}

async fn run(args: Args) -> model::Result<()> {
    let today = Local::now().date_naive();

    match args.command {
        Commands::Sync {
            tickers,
            history_years,
            abandon_days,
        } => {
            let config = model::SyncConfig {
                history_years,
                abandon_days: check_abandon_days(abandon_days)?,
            };

            // Input problems are fatal before any database or network work.
            let symbols = symbols::read_symbols_from_file(&tickers)?;
            log::info!("Loaded {} tickers from {}", symbols.len(), tickers);

            let mut conn = store::sqlite::init_sqlite_connection(&args.db)
                .map_err(model::SyncError::Config)?;

            let summary =
                sync::pull_and_save(&mut conn, &fetcher::YahooFetcher, &symbols, today, &config)
                    .await?;

            println!(
                "Updated {} symbols ({} rows), {} up-to-date, {} without new data, {} abandoned, {} failed.",
                summary.updated,
                summary.rows_written,
                summary.current,
                summary.no_data,
                summary.abandoned.len(),
                summary.failed.len()
            );
            for (symbol, reason) in &summary.failed {
                println!("  failed {symbol}: {reason}");
            }
        }

        Commands::Sweep {
            abandon_days,
            tracked_table,
        } => {
            let mut conn = store::sqlite::init_sqlite_connection(&args.db)
                .map_err(model::SyncError::Config)?;

            let report = sweep::sweep(
                &mut conn,
                today,
                check_abandon_days(abandon_days)?,
                &tracked_table,
            )?;

            println!("Abandoned stocks:");
            for stale in &report.abandoned {
                println!(
                    "  {:<10} last {}  {} days",
                    stale.symbol, stale.last_date, stale.days_since_update
                );
            }
            if report.tracked_table_found {
                println!(
                    "Removed {} symbols from '{}'.",
                    report.removed.len(),
                    tracked_table
                );
            } else {
                println!("No '{tracked_table}' table in database, skipping that step.");
            }
        }
    }
    Ok(())
}

#[tokio::main]
// Main function entry point.
async fn main() -> ExitCode {
    dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match run(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
