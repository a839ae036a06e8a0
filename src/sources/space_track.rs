use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::config::SpaceTrackConfig;
use crate::elements::{RawDecayPrediction, RawElementRecord};

use super::error::SourceError;
use super::http::{build_client, decode_rows, get_json};
use super::SourceAdapter;

/// Lower bound on mean motion for the element query, rev/day.
const ELEMENTS_MIN_MEAN_MOTION: f64 = 11.25;
const ELEMENTS_MAX_ECCENTRICITY: f64 = 0.25;

/// Space-Track.org: authenticated, provides both official decay predictions
/// and the latest element sets of low orbits.
pub struct SpaceTrack {
    base_url: String,
    username: String,
    password: String,
    elements_limit: usize,
    client: Client,
    /// Whether the cookie store holds a session the server accepted.
    logged_in: Mutex<bool>,
}

impl SpaceTrack {
    pub fn new(config: &SpaceTrackConfig, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            elements_limit: config.elements_limit,
            client: build_client(timeout, true)?,
            logged_in: Mutex::new(false),
        })
    }

    pub fn decay_query_url(&self, horizon_days: u32) -> String {
        format!(
            "{}/basicspacedata/query/class/decay_prediction/DECAY_EPOCH/%3Enow-{}/orderby/DECAY_EPOCH/format/json",
            self.base_url, horizon_days
        )
    }

    pub fn elements_query_url(&self) -> String {
        format!(
            "{}/basicspacedata/query/class/tle_latest/MEAN_MOTION/%3E{}/ECCENTRICITY/%3C{}/orderby/MEAN_MOTION%20desc/limit/{}/format/json",
            self.base_url, ELEMENTS_MIN_MEAN_MOTION, ELEMENTS_MAX_ECCENTRICITY, self.elements_limit
        )
    }

    async fn login(&self) -> Result<(), SourceError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(SourceError::Authentication("missing credentials".into()));
        }

        let url = format!("{}/ajaxauth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("identity", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { url, status });
        }

        // A rejected login still answers 200, with a JSON body saying so.
        let body = response.text().await?;
        if login_rejected(&body) {
            return Err(SourceError::Authentication("credentials rejected".into()));
        }

        log::info!("space-track: authenticated as {}", self.username);
        Ok(())
    }

    async fn ensure_session(&self) -> Result<(), SourceError> {
        let mut logged_in = self.logged_in.lock().await;
        if !*logged_in {
            self.login().await?;
            *logged_in = true;
        }
        Ok(())
    }

    /// GET a query, logging in again once if the session cookie has expired.
    async fn query<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        self.ensure_session().await?;
        match get_json(&self.client, url).await {
            Err(SourceError::Status { status, .. }) if session_expired(status) => {
                log::info!("space-track: session rejected ({}), logging in again", status);
                *self.logged_in.lock().await = false;
                self.ensure_session().await?;
                get_json(&self.client, url).await
            }
            result => result,
        }
    }
}

fn session_expired(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

fn login_rejected(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("Login").and_then(|l| l.as_str()).map(|l| l == "Failed"))
        .unwrap_or(false)
}

#[async_trait]
impl SourceAdapter for SpaceTrack {
    fn name(&self) -> &str {
        "space-track"
    }

    async fn fetch_elements(&self) -> Result<Vec<RawElementRecord>, SourceError> {
        let rows: Vec<serde_json::Value> = self.query(&self.elements_query_url()).await?;
        Ok(decode_rows(self.name(), rows))
    }

    async fn fetch_official_predictions(
        &self,
        horizon_days: u32,
    ) -> Result<Option<Vec<RawDecayPrediction>>, SourceError> {
        let rows: Vec<serde_json::Value> = self.query(&self.decay_query_url(horizon_days)).await?;
        Ok(Some(decode_rows(self.name(), rows)))
    }
}
