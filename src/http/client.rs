use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::constants;

// Shared HTTP client instance. A build failure is kept and reported on every request.
lazy_static::lazy_static! {
    static ref CLIENT: Result<reqwest::Client, String> = reqwest::Client::builder()
        .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .map_err(|e| e.to_string());
}

/// Custom error type for HTTP requests.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("HTTP error {1} for {0}. Response body: {2}")]
    HttpError(reqwest::Url, u16, String),
    #[error("Error deserializing JSON: {0}")]
    JsonError(String),
    #[error("Provider error: {0}")]
    Api(String),
    #[error("Other error: {0}")]
    Other(String),
}

/// Makes a GET request to the specified url and decodes the JSON body.
pub async fn get<T: DeserializeOwned>(
    url: &str,                 // Absolute url.
    params: &[(&str, String)], // Query parameters.
) -> Result<T, RequestError> {
    let url = reqwest::Url::parse_with_params(url, params)
        .map_err(|e| RequestError::Other(e.to_string()))?;

    let client = CLIENT
        .as_ref()
        .map_err(|e| RequestError::Other(format!("could not build HTTP client: {e}")))?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| RequestError::Other(e.to_string()))?;

    // Get the response status code.
    let status = response.status();

    // Handle non-success status codes.
    if !status.is_success() {
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::Other(e.to_string()))?;
        return Err(RequestError::HttpError(url, status.as_u16(), body));
    }

    // Deserialize the JSON response.
    response
        .json()
        .await
        .map_err(|e| RequestError::JsonError(e.to_string()))
}
