use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::decay::{DecayModel, Estimator};
use crate::fusion::{FusionLimits, Region, SourcePriority};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub limits: FusionLimits,
    pub raw_limits: RawLimits,
    pub decay_model: DecayModel,
    pub sources: SourcesConfig,
    pub region: Region,
    pub web: WebConfig,
    pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub altitude_ceiling_km: f64,
    pub horizon_days: u32,
    pub include_rocket_bodies: bool,
    pub include_debris: bool,
    /// Fall back to synthetic data when a run produces nothing.
    pub use_backup_data: bool,
    pub backup_count: usize,
    /// Fixed seed for position sampling and backup data.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            altitude_ceiling_km: 500.0,
            horizon_days: 7,
            include_rocket_bodies: true,
            include_debris: true,
            use_backup_data: false,
            backup_count: 20,
            seed: None,
        }
    }
}

/// Caps on raw records taken from each source before estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawLimits {
    pub primary: Option<usize>,
    pub secondary: Option<usize>,
}

impl Default for RawLimits {
    fn default() -> Self {
        Self {
            primary: Some(50),
            secondary: Some(100),
        }
    }
}

impl RawLimits {
    pub fn cap(&self, priority: SourcePriority) -> Option<usize> {
        match priority {
            SourcePriority::Primary => self.primary,
            SourcePriority::Secondary => self.secondary,
            SourcePriority::Official | SourcePriority::Backup => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub space_track: Option<SpaceTrackConfig>,
    pub celestrak: CelestrakConfig,
    pub tle_directory: Option<TleDirectoryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceTrackConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_space_track_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout: String,
    #[serde(default = "default_space_track_elements_limit")]
    pub elements_limit: usize,
}

fn default_space_track_url() -> String {
    "https://www.space-track.org".to_string()
}

fn default_space_track_elements_limit() -> usize {
    200
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CelestrakConfig {
    pub enabled: bool,
    /// Tried in order; the first non-empty response is used.
    pub urls: Vec<String>,
    /// Rows at or below this mean motion are dropped before estimation.
    pub min_mean_motion: f64,
    pub timeout: String,
}

impl Default for CelestrakConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            urls: vec![
                "https://celestrak.org/NORAD/elements/gp.php?GROUP=active&FORMAT=json".to_string(),
                "https://celestrak.org/NORAD/elements/gp.php?GROUP=analyst&FORMAT=json".to_string(),
            ],
            min_mean_motion: 11.25,
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TleDirectoryConfig {
    pub path: PathBuf,
    #[serde(default = "default_tle_priority")]
    pub priority: SourcePriority,
}

fn default_tle_priority() -> SourcePriority {
    SourcePriority::Secondary
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
    pub refresh_interval: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            refresh_interval: "15m".to_string(),
        }
    }
}

fn default_timeout() -> String {
    "10s".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
    pub key: String,
    pub name: String,
    pub permissions: HashSet<Permission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Permission {
    ViewReentries,
    RefreshReentries,
}

/// No estimate may come out sooner than this, whatever the overrides.
const MIN_DAYS_LOWER_BOUND: f64 = 0.1;

pub fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|e| invalid(field, e.to_string()))
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ceiling = self.pipeline.altitude_ceiling_km;
        if !(ceiling.is_finite() && ceiling > 0.0) {
            return Err(invalid("pipeline.altitude_ceiling_km", format!("{ceiling}")));
        }
        if self.pipeline.horizon_days == 0 {
            return Err(invalid("pipeline.horizon_days", "must be at least 1"));
        }

        let model = &self.decay_model;
        if model.low_band_upper_km >= model.mid_band_upper_km {
            return Err(invalid(
                "decay_model",
                "low_band_upper_km must be below mid_band_upper_km",
            ));
        }
        for (name, band) in [
            ("decay_model.low_band", model.low_band),
            ("decay_model.mid_band", model.mid_band),
            ("decay_model.high_band", model.high_band),
        ] {
            if !(band.divisor.is_finite() && band.divisor > 0.0) {
                return Err(invalid(name, "divisor must be positive"));
            }
            if !(band.floor_days.is_finite() && band.floor_days >= 0.0) {
                return Err(invalid(name, "floor_days must be a non-negative number"));
            }
        }
        if !(model.min_days.is_finite() && model.min_days >= MIN_DAYS_LOWER_BOUND) {
            return Err(invalid(
                "decay_model.min_days",
                format!("must be at least {MIN_DAYS_LOWER_BOUND}"),
            ));
        }
        // Above 1 the factor could turn negative for eccentric orbits.
        if !(0.0..=1.0).contains(&model.eccentricity_weight) {
            return Err(invalid("decay_model.eccentricity_weight", "must be within [0, 1]"));
        }
        if model.risk_high_below_km > model.risk_medium_below_km {
            return Err(invalid(
                "decay_model",
                "risk_high_below_km must not exceed risk_medium_below_km",
            ));
        }

        self.request_timeouts()?;
        self.refresh_interval()?;
        Ok(())
    }

    pub fn estimator(&self) -> Estimator {
        Estimator::new(self.pipeline.altitude_ceiling_km).with_model(self.decay_model)
    }

    pub fn refresh_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration("web.refresh_interval", &self.web.refresh_interval)
    }

    /// (space-track, celestrak) request timeouts.
    pub fn request_timeouts(&self) -> Result<(Option<Duration>, Duration), ConfigError> {
        let space_track = self
            .sources
            .space_track
            .as_ref()
            .map(|st| parse_duration("sources.space_track.timeout", &st.timeout))
            .transpose()?;
        let celestrak = parse_duration("sources.celestrak.timeout", &self.sources.celestrak.timeout)?;
        Ok((space_track, celestrak))
    }

    pub fn find_api_key(&self, key: &str) -> Option<&ApiKey> {
        self.api_keys.iter().find(|k| k.key == key)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        // An empty document is a valid, all-defaults configuration.
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }
}
