use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::CelestrakConfig;
use crate::elements::RawElementRecord;

use super::error::SourceError;
use super::http::{build_client, decode_rows, get_json};
use super::SourceAdapter;

/// CelesTrak GP element sets. No authentication, no official predictions.
pub struct CelesTrak {
    urls: Vec<String>,
    min_mean_motion: f64,
    client: Client,
}

impl CelesTrak {
    pub fn new(config: &CelestrakConfig, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            urls: config.urls.clone(),
            min_mean_motion: config.min_mean_motion,
            client: build_client(timeout, false)?,
        })
    }
}

/// Keep low, fast orbits. Rows without a readable mean motion are passed on so
/// they are accounted for as malformed downstream.
pub fn low_orbit_filter(records: Vec<RawElementRecord>, min_mean_motion: f64) -> Vec<RawElementRecord> {
    records
        .into_iter()
        .filter(|r| r.mean_motion_hint().map_or(true, |mm| mm > min_mean_motion))
        .collect()
}

#[async_trait]
impl SourceAdapter for CelesTrak {
    fn name(&self) -> &str {
        "celestrak"
    }

    async fn fetch_elements(&self) -> Result<Vec<RawElementRecord>, SourceError> {
        let mut first_error = None;
        let mut answered = false;

        for (i, url) in self.urls.iter().enumerate() {
            log::debug!("celestrak: trying endpoint {} of {}", i + 1, self.urls.len());
            match get_json::<Vec<serde_json::Value>>(&self.client, url).await {
                Ok(rows) if !rows.is_empty() => {
                    let records = decode_rows(self.name(), rows);
                    log::info!("celestrak: {} element sets from {}", records.len(), url);
                    return Ok(low_orbit_filter(records, self.min_mean_motion));
                }
                Ok(_) => {
                    log::warn!("celestrak: {} returned no data", url);
                    answered = true;
                }
                Err(e) => {
                    log::warn!("celestrak: {} failed: {}", url, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        // Only a source that never answered is unavailable; an empty answer is "no data".
        match first_error {
            Some(e) if !answered => Err(e),
            _ => Ok(Vec::new()),
        }
    }
}
