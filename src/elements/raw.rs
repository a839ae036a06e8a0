use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ElementsError;
use super::types::{OrbitalElementRecord, RecordSource};

/// A JSON scalar that providers emit either as a number or as a string.
///
/// Space-Track quotes every value, CelesTrak does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self, field: &'static str) -> Result<f64, ElementsError> {
        match self {
            Scalar::Integer(i) => Ok(*i as f64),
            Scalar::Number(n) => Ok(*n),
            Scalar::Text(s) => s.trim().parse().map_err(|_| ElementsError::NotNumeric {
                field,
                value: s.clone(),
            }),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Scalar::Integer(i) => i.to_string(),
            Scalar::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// General-perturbations element set in OMM/JSON form, as served by CelesTrak
/// (`gp.php`) and Space-Track (`tle_latest`). Only the fields the estimator
/// uses are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawElementRecord {
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub norad_cat_id: Option<Scalar>,
    #[serde(default)]
    pub mean_motion: Option<Scalar>,
    #[serde(default)]
    pub eccentricity: Option<Scalar>,
    #[serde(default)]
    pub inclination: Option<Scalar>,
}

impl RawElementRecord {
    /// Normalize into an [`OrbitalElementRecord`].
    ///
    /// Mean motion is required. Eccentricity and inclination default to zero
    /// when a provider omits them.
    pub fn to_record(&self, source: RecordSource) -> Result<OrbitalElementRecord, ElementsError> {
        let mean_motion = self
            .mean_motion
            .as_ref()
            .ok_or(ElementsError::MissingField("MEAN_MOTION"))?
            .as_f64("MEAN_MOTION")?;
        let eccentricity = optional_f64(&self.eccentricity, "ECCENTRICITY")?;
        let inclination = optional_f64(&self.inclination, "INCLINATION")?;

        let object_name = self
            .object_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown")
            .to_string();

        let record = OrbitalElementRecord {
            object_name,
            catalog_id: self.norad_cat_id.as_ref().map(Scalar::as_text),
            mean_motion,
            eccentricity,
            inclination,
            source,
        };
        record.validate()?;
        Ok(record)
    }

    /// Mean motion if present and numeric; used for cheap pre-filtering.
    pub fn mean_motion_hint(&self) -> Option<f64> {
        self.mean_motion
            .as_ref()
            .and_then(|m| m.as_f64("MEAN_MOTION").ok())
    }
}

fn optional_f64(value: &Option<Scalar>, field: &'static str) -> Result<f64, ElementsError> {
    value.as_ref().map_or(Ok(0.0), |v| v.as_f64(field))
}

/// One row of an official decay prediction feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawDecayPrediction {
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub norad_cat_id: Option<Scalar>,
    #[serde(default)]
    pub decay_epoch: Option<String>,
    #[serde(default)]
    pub window: Option<Scalar>,
}

/// Parse the timestamp formats seen in decay feeds. Naive timestamps are UTC.
pub fn parse_epoch(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}
