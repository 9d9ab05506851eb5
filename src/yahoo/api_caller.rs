use super::response;
use crate::http::client::{self, RequestError};
use crate::model;
use chrono::{DateTime, Days, NaiveDate, NaiveTime};

// Base URL for the chart API.
const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart/";

// Returns the provider error embedded in the chart payload, if any.
fn check_error(err: &Option<response::ChartError>) -> Result<(), RequestError> {
    match err {
        None => Ok(()),
        Some(e) => Err(RequestError::Api(format!("{}: {}", e.code, e.description))),
    }
}

// Value at `i`, treating a short column as null.
fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

// Seconds since epoch of midnight UTC on `date`.
fn day_start_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::default()).and_utc().timestamp()
}

// Chart url for `symbol`, percent-encoded as a single path segment.
fn chart_url(symbol: &str) -> Result<reqwest::Url, RequestError> {
    let mut url = reqwest::Url::parse(BASE_URL).map_err(|e| RequestError::Other(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| RequestError::Other(format!("cannot append to {BASE_URL}")))?
        .pop_if_empty()
        .push(symbol);
    Ok(url)
}

/// Fetches daily bars for `symbol` between `start` and `end`, both inclusive.
pub async fn daily_candles(
    symbol: &str,     // Stock symbol.
    start: NaiveDate, // First day wanted.
    end: NaiveDate,   // Last day wanted.
) -> Result<Vec<model::RawBar>, RequestError> {
    // period2 is exclusive on the provider side.
    let end_exclusive = end
        .checked_add_days(Days::new(1))
        .ok_or_else(|| RequestError::Other(format!("end date out of range: {end}")))?;

    let url = chart_url(symbol)?;
    let resp = client::get::<response::ChartResponse>(
        url.as_str(),
        &[
            ("period1", day_start_timestamp(start).to_string()),
            ("period2", day_start_timestamp(end_exclusive).to_string()),
            ("interval", "1d".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ],
    )
    .await?;

    bars_from_chart(resp)
}

/// Converts a chart payload into bars. A payload without timestamps means no data.
pub fn bars_from_chart(
    resp: response::ChartResponse,
) -> Result<Vec<model::RawBar>, RequestError> {
    check_error(&resp.chart.error)?;

    let data = match resp.chart.result.and_then(|r| r.into_iter().next()) {
        Some(data) => data,
        None => return Ok(Vec::new()),
    };
    let timestamps = match data.timestamp {
        Some(t) => t,
        None => return Ok(Vec::new()),
    };

    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        // Bars are stamped at the session open; shift into exchange time before taking the date.
        let date = DateTime::from_timestamp(ts + offset, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| RequestError::Other(format!("invalid timestamp: {ts}")))?;

        let bar = model::RawBar {
            date,
            open: at(&quote.open, i),
            high: at(&quote.high, i),
            low: at(&quote.low, i),
            close: at(&quote.close, i),
            adj_close: at(&adj_closes, i),
            volume: at(&quote.volume, i),
        };

        // Placeholder rows for non-trading days carry no prices at all.
        if bar.open.is_none()
            && bar.high.is_none()
            && bar.low.is_none()
            && bar.close.is_none()
            && bar.volume.is_none()
        {
            continue;
        }
        bars.push(bar);
    }
    Ok(bars)
}
