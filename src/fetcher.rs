use chrono::NaiveDate;

use crate::{http::client::RequestError, model, yahoo::api_caller};

/// Source of daily bars for the sync loop.
///
/// `end` is inclusive. An empty vector means the provider had nothing new for
/// the range and is not an error.
pub trait Fetcher {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<model::RawBar>, RequestError>;
}

/// Fetches from the Yahoo Finance chart API.
pub struct YahooFetcher;

impl Fetcher for YahooFetcher {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<model::RawBar>, RequestError> {
        api_caller::daily_candles(symbol, start, end).await
    }
}
