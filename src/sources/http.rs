use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::error::SourceError;

pub const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(1);
const USER_AGENT: &str = concat!("reentry-watch/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout: Duration, cookies: bool) -> Result<Client, SourceError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .cookie_store(cookies)
        .build()?;
    Ok(client)
}

/// Rate limiting and server-side failures are worth another attempt.
pub fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// GET `url` and decode the body as JSON, retrying transient failures with a
/// linear backoff.
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, SourceError> {
    let mut attempt = 1;
    loop {
        if attempt > 1 {
            let delay = RETRY_BACKOFF * (attempt - 1);
            log::debug!(
                "retrying {} after {:?} (attempt {}/{})",
                url,
                delay,
                attempt,
                MAX_ATTEMPTS
            );
            tokio::time::sleep(delay).await;
        }

        let err = match client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                let body = response.text().await?;
                return Ok(serde_json::from_str(&body)?);
            }
            Ok(response) => {
                let status = response.status();
                let err = SourceError::Status {
                    url: url.to_string(),
                    status,
                };
                if !is_retryable(status) {
                    return Err(err);
                }
                err
            }
            Err(e) if is_transient(&e) => SourceError::Http(e),
            Err(e) => return Err(SourceError::Http(e)),
        };

        if attempt >= MAX_ATTEMPTS {
            log::warn!("giving up on {} after {} attempts: {}", url, attempt, err);
            return Err(err);
        }
        log::warn!("attempt {}/{} for {} failed: {}", attempt, MAX_ATTEMPTS, url, err);
        attempt += 1;
    }
}

/// Decode rows one at a time so a single odd row does not sink the batch.
pub fn decode_rows<T: DeserializeOwned>(source: &str, rows: Vec<serde_json::Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect();
    if decoded.len() < total {
        log::warn!(
            "{}: dropped {} of {} rows that did not decode",
            source,
            total - decoded.len(),
            total
        );
    }
    decoded
}
