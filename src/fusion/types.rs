use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::decay::{DataOrigin, DecayEstimate, RiskLevel};
use crate::elements::{parse_epoch, RawDecayPrediction};

/// Label used for official predictions wherever an object type is expected.
pub const OFFICIAL_TYPE_LABEL: &str = "Official Prediction";

/// Reentry prediction published by an authoritative source. Carries a decay
/// epoch instead of derived orbital quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OfficialPrediction {
    pub catalog_id: Option<String>,
    pub object_name: String,
    pub decay_epoch: Option<DateTime<Utc>>,
    /// Uncertainty window as published, e.g. hours either side of the epoch.
    pub window: Option<String>,
    pub risk_level: RiskLevel,
    pub data_origin: DataOrigin,
}

impl OfficialPrediction {
    pub fn from_raw(raw: &RawDecayPrediction) -> Self {
        Self {
            catalog_id: raw.norad_cat_id.as_ref().map(|id| id.as_text()),
            object_name: raw
                .object_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or("Unknown")
                .to_string(),
            decay_epoch: raw.decay_epoch.as_deref().and_then(parse_epoch),
            window: raw.window.as_ref().map(|w| w.as_text()),
            risk_level: RiskLevel::Medium,
            data_origin: DataOrigin::OfficialPrediction,
        }
    }

    /// Fractional days from `now` until the decay epoch; negative if it has passed.
    pub fn days_until(&self, now: DateTime<Utc>) -> Option<f64> {
        self.decay_epoch
            .map(|epoch| (epoch - now).num_milliseconds() as f64 / 86_400_000.0)
    }
}

/// One entry of a fused result list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Candidate {
    Official(OfficialPrediction),
    Calculated(DecayEstimate),
}

impl Candidate {
    pub fn catalog_id(&self) -> Option<&str> {
        match self {
            Candidate::Official(p) => p.catalog_id.as_deref(),
            Candidate::Calculated(e) => e.catalog_id.as_deref(),
        }
    }

    pub fn object_name(&self) -> &str {
        match self {
            Candidate::Official(p) => &p.object_name,
            Candidate::Calculated(e) => &e.object_name,
        }
    }

    pub fn data_origin(&self) -> DataOrigin {
        match self {
            Candidate::Official(p) => p.data_origin,
            Candidate::Calculated(e) => e.data_origin,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Candidate::Official(p) => p.risk_level,
            Candidate::Calculated(e) => e.risk_level,
        }
    }

    pub fn type_label(&self) -> String {
        match self {
            Candidate::Official(_) => OFFICIAL_TYPE_LABEL.to_string(),
            Candidate::Calculated(e) => e.object_type.to_string(),
        }
    }

    pub fn as_estimate(&self) -> Option<&DecayEstimate> {
        match self {
            Candidate::Calculated(e) => Some(e),
            Candidate::Official(_) => None,
        }
    }

    /// Urgency in days: the derived estimate for calculated entries, the
    /// decay epoch for official ones.
    pub fn rank_days(&self, now: DateTime<Utc>) -> Option<f64> {
        match self {
            Candidate::Official(p) => p.days_until(now),
            Candidate::Calculated(e) => Some(e.days_to_reentry),
        }
    }

    pub fn expected_reentry(&self) -> Option<DateTime<Utc>> {
        match self {
            Candidate::Official(p) => p.decay_epoch,
            Candidate::Calculated(e) => Some(e.estimated_reentry_time),
        }
    }
}

/// Merge precedence of a source; lower sorts first and wins duplicates.
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
#[strum(serialize_all = "snake_case")]
pub enum SourcePriority {
    Official,
    Primary,
    Secondary,
    Backup,
}

/// Everything one adapter contributed to a run, at one priority.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: String,
    pub priority: SourcePriority,
    pub candidates: Vec<Candidate>,
}

impl SourceBatch {
    pub fn new(source: impl Into<String>, priority: SourcePriority, candidates: Vec<Candidate>) -> Self {
        Self {
            source: source.into(),
            priority,
            candidates,
        }
    }
}
