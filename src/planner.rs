use chrono::{Days, NaiveDate};
use rusqlite::Connection;

use crate::{constants, model, store::stock_data};

/// Parses a stored `stock_data.date` value.
///
/// Accepts `YYYY-MM-DD` and anything that starts with it, such as
/// `YYYY-MM-DD HH:MM:SS` written by older tooling.
pub fn parse_stored_date(symbol: &str, value: &str) -> model::Result<NaiveDate> {
    let invalid = || model::SyncError::InvalidStoredDate {
        symbol: symbol.into(),
        value: value.into(),
    };
    let head = value.trim().get(..10).ok_or_else(invalid)?;
    NaiveDate::parse_from_str(head, constants::DATE_FORMAT).map_err(|_| invalid())
}

/// Decides what to fetch for a symbol given its newest stored date.
pub fn decide(
    latest: Option<NaiveDate>,
    today: NaiveDate,
    config: &model::SyncConfig,
) -> model::SyncDecision {
    let latest = match latest {
        Some(latest) => latest,
        None => {
            let start = today
                .checked_sub_days(Days::new(config.history_days()))
                .unwrap_or(NaiveDate::MIN);
            return model::SyncDecision::Fetch { start, end: today };
        }
    };

    let days_since = (today - latest).num_days();
    if days_since > config.abandon_days {
        return model::SyncDecision::SkipAbandoned { latest, days_since };
    }

    match latest.succ_opt() {
        Some(start) if start <= today => model::SyncDecision::Fetch { start, end: today },
        _ => model::SyncDecision::SkipCurrent { latest },
    }
}

/// Plans the sync of `symbol` from what is currently stored.
pub fn plan(
    conn: &Connection,
    symbol: &str,
    today: NaiveDate,
    config: &model::SyncConfig,
) -> model::Result<model::SyncDecision> {
    let latest = match stock_data::latest_date(conn, symbol)? {
        Some(value) => Some(parse_stored_date(symbol, &value)?),
        None => None,
    };
    Ok(decide(latest, today, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SyncDecision;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> model::SyncConfig {
        model::SyncConfig {
            history_years: 20,
            abandon_days: 180,
        }
    }

    #[test]
    fn new_symbol_gets_full_history() {
        let today = date(2024, 1, 10);
        assert_eq!(
            decide(None, today, &config()),
            SyncDecision::Fetch {
                start: date(2004, 1, 15), // 20 * 365 days back
                end: today,
            }
        );
    }

    #[test]
    fn fetch_starts_the_day_after_latest() {
        let today = date(2024, 1, 10);
        for latest in [date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 9)] {
            assert_eq!(
                decide(Some(latest), today, &config()),
                SyncDecision::Fetch {
                    start: latest.succ_opt().unwrap(),
                    end: today,
                }
            );
        }
    }

    #[test]
    fn latest_equal_to_today_is_current() {
        let today = date(2024, 1, 10);
        assert_eq!(
            decide(Some(today), today, &config()),
            SyncDecision::SkipCurrent { latest: today }
        );
        // Rows dated in the future never trigger a fetch either.
        assert_eq!(
            decide(Some(date(2024, 1, 12)), today, &config()),
            SyncDecision::SkipCurrent {
                latest: date(2024, 1, 12)
            }
        );
    }

    #[test]
    fn abandon_threshold_is_exclusive() {
        let today = date(2024, 1, 10);
        let at_threshold = today.checked_sub_days(Days::new(180)).unwrap();
        let past_threshold = today.checked_sub_days(Days::new(181)).unwrap();

        assert_eq!(
            decide(Some(at_threshold), today, &config()),
            SyncDecision::Fetch {
                start: at_threshold.succ_opt().unwrap(),
                end: today,
            }
        );
        assert_eq!(
            decide(Some(past_threshold), today, &config()),
            SyncDecision::SkipAbandoned {
                latest: past_threshold,
                days_since: 181,
            }
        );
    }

    #[test]
    fn stale_symbol_is_abandoned() {
        assert_eq!(
            decide(Some(date(2023, 1, 1)), date(2023, 9, 1), &config()),
            SyncDecision::SkipAbandoned {
                latest: date(2023, 1, 1),
                days_since: 243,
            }
        );
    }

    #[test]
    fn parses_stored_dates() {
        assert_eq!(parse_stored_date("AAA", "2024-01-05").unwrap(), date(2024, 1, 5));
        assert_eq!(
            parse_stored_date("AAA", "2024-01-05 00:00:00").unwrap(),
            date(2024, 1, 5)
        );
        assert!(matches!(
            parse_stored_date("AAA", "05/01/2024"),
            Err(model::SyncError::InvalidStoredDate { .. })
        ));
        assert!(parse_stored_date("AAA", "2024").is_err());
    }

    #[test]
    fn plan_reads_latest_stored_date() {
        let conn = Connection::open_in_memory().unwrap();
        stock_data::create_table(&conn).unwrap();
        conn.execute(
            "INSERT INTO stock_data (ticker, date, close) VALUES ('AAA', '2024-01-05', 1.0)",
            [],
        )
        .unwrap();

        let today = date(2024, 1, 10);
        assert_eq!(
            plan(&conn, "AAA", today, &config()).unwrap(),
            SyncDecision::Fetch {
                start: date(2024, 1, 6),
                end: today,
            }
        );
        assert!(matches!(
            plan(&conn, "ZZZ", today, &config()).unwrap(),
            SyncDecision::Fetch { .. }
        ));
    }
}
