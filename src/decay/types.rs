use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    #[strum(serialize = "Rocket Body")]
    RocketBody,
    Debris,
    Satellite,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    #[strum(serialize = "official")]
    OfficialPrediction,
    #[strum(serialize = "calculated")]
    CalculatedFromElements,
}

/// Proximity of an estimated position to the configured region of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegionProximity {
    pub region: String,
    pub distance_km: f64,
    pub inside: bool,
}

/// Heuristic reentry estimate derived from one element record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DecayEstimate {
    pub catalog_id: Option<String>,
    pub object_name: String,
    pub mean_motion: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub altitude_km: f64,
    pub days_to_reentry: f64,
    pub estimated_reentry_time: DateTime<Utc>,
    pub estimated_latitude: f64,
    pub estimated_longitude: f64,
    pub object_type: ObjectType,
    pub size_estimate: String,
    pub mass_estimate: String,
    pub risk_level: RiskLevel,
    pub data_origin: DataOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionProximity>,
}
