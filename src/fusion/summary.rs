use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::types::Candidate;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AltitudeStats {
    pub min_km: f64,
    pub mean_km: f64,
    pub max_km: f64,
}

/// Distribution figures over a fused result list.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Summary {
    pub total: usize,
    pub by_risk: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub by_origin: BTreeMap<String, usize>,
    /// Calculated entries only; official predictions carry no altitude.
    pub altitude: Option<AltitudeStats>,
    pub inside_region: usize,
    pub next_reentry: Option<DateTime<Utc>>,
}

impl Summary {
    pub fn from_entries(entries: &[Candidate]) -> Self {
        let mut by_risk = BTreeMap::new();
        let mut by_type = BTreeMap::new();
        let mut by_origin = BTreeMap::new();

        for entry in entries {
            *by_risk.entry(entry.risk_level().to_string()).or_insert(0) += 1;
            *by_type.entry(entry.type_label()).or_insert(0) += 1;
            *by_origin.entry(entry.data_origin().to_string()).or_insert(0) += 1;
        }

        let altitudes: Vec<f64> = entries
            .iter()
            .filter_map(Candidate::as_estimate)
            .map(|e| e.altitude_km)
            .collect();
        let altitude = (!altitudes.is_empty()).then(|| AltitudeStats {
            min_km: altitudes.iter().copied().fold(f64::INFINITY, f64::min),
            mean_km: altitudes.iter().sum::<f64>() / altitudes.len() as f64,
            max_km: altitudes.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        });

        let inside_region = entries
            .iter()
            .filter_map(Candidate::as_estimate)
            .filter(|e| e.region.as_ref().is_some_and(|r| r.inside))
            .count();

        Self {
            total: entries.len(),
            by_risk,
            by_type,
            by_origin,
            altitude,
            inside_region,
            next_reentry: entries.iter().filter_map(Candidate::expected_reentry).min(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::{DataOrigin, DecayEstimate, ObjectType, RegionProximity, RiskLevel};
    use crate::fusion::OfficialPrediction;

    fn estimate(altitude_km: f64, object_type: ObjectType, risk: RiskLevel, inside: bool) -> Candidate {
        Candidate::Calculated(DecayEstimate {
            catalog_id: None,
            object_name: "X".into(),
            mean_motion: 16.0,
            eccentricity: 0.0,
            inclination: 51.0,
            altitude_km,
            days_to_reentry: 1.0,
            estimated_reentry_time: Utc::now(),
            estimated_latitude: 0.0,
            estimated_longitude: 0.0,
            object_type,
            size_estimate: String::new(),
            mass_estimate: String::new(),
            risk_level: risk,
            data_origin: DataOrigin::CalculatedFromElements,
            region: Some(RegionProximity {
                region: "Germany".into(),
                distance_km: 0.0,
                inside,
            }),
        })
    }

    #[test]
    fn test_counts() {
        let entries = vec![
            estimate(140.0, ObjectType::RocketBody, RiskLevel::High, true),
            estimate(220.0, ObjectType::Debris, RiskLevel::Medium, false),
            estimate(300.0, ObjectType::Debris, RiskLevel::Low, false),
            Candidate::Official(OfficialPrediction {
                catalog_id: Some("1".into()),
                object_name: "O".into(),
                decay_epoch: None,
                window: None,
                risk_level: RiskLevel::Medium,
                data_origin: DataOrigin::OfficialPrediction,
            }),
        ];
        let summary = Summary::from_entries(&entries);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.by_risk["Medium"], 2);
        assert_eq!(summary.by_risk["High"], 1);
        assert_eq!(summary.by_type["Debris"], 2);
        assert_eq!(summary.by_type["Rocket Body"], 1);
        assert_eq!(summary.by_type["Official Prediction"], 1);
        assert_eq!(summary.by_origin["official"], 1);
        assert_eq!(summary.by_origin["calculated"], 3);
        assert_eq!(summary.inside_region, 1);

        let alt = summary.altitude.unwrap();
        assert_eq!(alt.min_km, 140.0);
        assert_eq!(alt.max_km, 300.0);
        assert!((alt.mean_km - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty() {
        let summary = Summary::from_entries(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.altitude.is_none());
        assert!(summary.next_reentry.is_none());
    }
}
