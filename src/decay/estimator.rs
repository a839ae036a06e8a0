use std::f64::consts::TAU;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::elements::{OrbitalElementRecord, RecordSource};

use super::classify::{classify, physical_estimates};
use super::constants::{EARTH_RADIUS_M, GM_EARTH_M3_S2, SECONDS_PER_DAY};
use super::model::DecayModel;
use super::types::{DataOrigin, DecayEstimate};

pub const DEFAULT_ALTITUDE_CEILING_KM: f64 = 500.0;

/// Mean altitude above the mean Earth radius, from Kepler's third law.
///
/// Returns `None` for non-positive mean motion.
pub fn altitude_km(mean_motion_rev_day: f64) -> Option<f64> {
    if !(mean_motion_rev_day > 0.0) {
        return None;
    }
    let n = mean_motion_rev_day * TAU / SECONDS_PER_DAY;
    let semi_major_axis_m = (GM_EARTH_M3_S2 / (n * n)).cbrt();
    let altitude = (semi_major_axis_m - EARTH_RADIUS_M) / 1000.0;
    altitude.is_finite().then_some(altitude)
}

/// Placeholder ground position: uniform within the latitude band the
/// inclination can reach, any longitude. Not a ground-track projection.
pub fn sample_position<R: Rng + ?Sized>(inclination_deg: f64, rng: &mut R) -> (f64, f64) {
    let lat_range = if inclination_deg <= 90.0 {
        inclination_deg
    } else {
        180.0 - inclination_deg
    }
    .clamp(0.0, 90.0);

    let latitude = rng.random_range(-lat_range..=lat_range);
    let longitude = rng.random_range(-180.0..=180.0);
    (latitude, longitude)
}

/// Decay estimation with explicit configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimator {
    pub altitude_ceiling_km: f64,
    pub model: DecayModel,
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(DEFAULT_ALTITUDE_CEILING_KM)
    }
}

impl Estimator {
    pub fn new(altitude_ceiling_km: f64) -> Self {
        Self {
            altitude_ceiling_km,
            model: DecayModel::default(),
        }
    }

    pub fn with_model(mut self, model: DecayModel) -> Self {
        self.model = model;
        self
    }

    /// Estimate the reentry of one object, or `None` when the record is not a
    /// near-term candidate (too high, too slow, or numerically unusable).
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        record: &OrbitalElementRecord,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<DecayEstimate> {
        if !record.eccentricity.is_finite() || !record.inclination.is_finite() {
            return None;
        }
        let altitude_km = altitude_km(record.mean_motion)?;

        if altitude_km >= self.altitude_ceiling_km || record.mean_motion <= self.model.min_mean_motion
        {
            return None;
        }

        let days_to_reentry = self
            .model
            .days_to_reentry(altitude_km, record.eccentricity);
        if !days_to_reentry.is_finite() {
            return None;
        }
        let offset = Duration::try_milliseconds((days_to_reentry * 86_400_000.0).round() as i64)?;
        let estimated_reentry_time = now.checked_add_signed(offset)?;

        let (estimated_latitude, estimated_longitude) = sample_position(record.inclination, rng);

        let object_type = classify(&record.object_name);
        let (size, mass) = physical_estimates(object_type);

        let data_origin = match record.source {
            RecordSource::OfficialPrediction => DataOrigin::OfficialPrediction,
            RecordSource::Calculated => DataOrigin::CalculatedFromElements,
        };

        Some(DecayEstimate {
            catalog_id: record.catalog_id.clone(),
            object_name: record.object_name.clone(),
            mean_motion: record.mean_motion,
            eccentricity: record.eccentricity,
            inclination: record.inclination,
            altitude_km,
            days_to_reentry,
            estimated_reentry_time,
            estimated_latitude,
            estimated_longitude,
            object_type,
            size_estimate: size.to_string(),
            mass_estimate: mass.to_string(),
            risk_level: self.model.risk_level(altitude_km),
            data_origin,
            region: None,
        })
    }
}

/// [`Estimator::estimate`] with the default decay model.
pub fn estimate<R: Rng + ?Sized>(
    record: &OrbitalElementRecord,
    altitude_ceiling_km: f64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Option<DecayEstimate> {
    Estimator::new(altitude_ceiling_km).estimate(record, now, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::{ObjectType, RiskLevel};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(name: &str, mean_motion: f64, eccentricity: f64, inclination: f64) -> OrbitalElementRecord {
        OrbitalElementRecord {
            object_name: name.into(),
            catalog_id: Some("22675".into()),
            mean_motion,
            eccentricity,
            inclination,
            source: RecordSource::Calculated,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_altitude_known_values() {
        let iss_like = altitude_km(15.5).unwrap();
        assert!((iss_like - 423.86).abs() < 0.1, "got {iss_like}");
        let low = altitude_km(16.5).unwrap();
        assert!((low - 146.47).abs() < 0.1, "got {low}");
    }

    #[test]
    fn test_altitude_monotonic_in_mean_motion() {
        let mut previous = f64::INFINITY;
        let mut mm = 0.5;
        while mm < 20.0 {
            let alt = altitude_km(mm).unwrap();
            assert!(alt < previous, "altitude not decreasing at {mm}");
            previous = alt;
            mm += 0.05;
        }
    }

    #[test]
    fn test_non_positive_mean_motion_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        for mm in [0.0, -1.0, -15.5] {
            assert!(altitude_km(mm).is_none());
            assert!(estimate(&record("X", mm, 0.0, 51.6), 500.0, now(), &mut rng).is_none());
        }
    }

    #[test]
    fn test_ceiling_and_slow_orbits_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        // ~424 km, above a 400 km ceiling
        assert!(estimate(&record("X", 15.5, 0.0, 51.6), 400.0, now(), &mut rng).is_none());
        // Slow orbit is rejected even under a huge ceiling
        assert!(estimate(&record("X", 11.0, 0.0, 51.6), 5000.0, now(), &mut rng).is_none());
        assert!(estimate(&record("X", 10.0, 0.0, 51.6), 50_000.0, now(), &mut rng).is_none());
        // Just above the mean motion threshold with a ceiling high enough
        assert!(estimate(&record("X", 11.01, 0.0, 51.6), 5000.0, now(), &mut rng).is_some());
    }

    #[test]
    fn test_cosmos_debris_example() {
        let mut rng = StdRng::seed_from_u64(3);
        let est = estimate(
            &record("COSMOS 2251 DEB", 15.5, 0.001, 51.6),
            500.0,
            now(),
            &mut rng,
        )
        .unwrap();

        assert!((est.altitude_km - 423.86).abs() < 0.1);
        // high band: max(7, 423.86 / 20) * (1 - 0.0005)
        let expected = est.altitude_km / 20.0 * 0.9995;
        assert!((est.days_to_reentry - expected).abs() < 1e-9);
        assert!((est.days_to_reentry - 21.18).abs() < 0.01);
        assert_eq!(est.object_type, ObjectType::Debris);
        assert_eq!(est.risk_level, RiskLevel::Low);
        assert_eq!(est.size_estimate, "0.5–2m");
        assert_eq!(est.catalog_id.as_deref(), Some("22675"));
        assert_eq!(est.data_origin, DataOrigin::CalculatedFromElements);
    }

    #[test]
    fn test_starlink_example() {
        let mut rng = StdRng::seed_from_u64(4);
        let est = estimate(&record("STARLINK-1007", 16.2, 0.0, 97.0), 500.0, now(), &mut rng).unwrap();
        assert!((est.altitude_km - 226.69).abs() < 0.1);
        assert!((est.days_to_reentry - est.altitude_km / 30.0).abs() < 1e-9);
        assert_eq!(est.object_type, ObjectType::Satellite);
        assert_eq!(est.risk_level, RiskLevel::Medium);
        // 180 - 97 = 83 degrees of reachable latitude
        assert!(est.estimated_latitude.abs() <= 83.0);
    }

    #[test]
    fn test_high_risk_low_band() {
        let mut rng = StdRng::seed_from_u64(5);
        let est = estimate(&record("CZ-5B R/B", 16.5, 0.0, 41.5), 500.0, now(), &mut rng).unwrap();
        assert_eq!(est.risk_level, RiskLevel::High);
        assert_eq!(est.object_type, ObjectType::RocketBody);
        assert!((est.days_to_reentry - est.altitude_km / 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_days_floor_with_extreme_eccentricity() {
        let mut rng = StdRng::seed_from_u64(6);
        for mm in [16.9, 17.0, 17.2, 18.0] {
            let est = estimate(&record("X", mm, 0.95, 10.0), 500.0, now(), &mut rng).unwrap();
            assert!(est.days_to_reentry >= 0.1, "{mm}: {}", est.days_to_reentry);
        }
    }

    #[test]
    fn test_reentry_time_offset() {
        let mut rng = StdRng::seed_from_u64(7);
        let est = estimate(&record("X", 16.2, 0.0, 51.6), 500.0, now(), &mut rng).unwrap();
        let offset_days =
            (est.estimated_reentry_time - now()).num_milliseconds() as f64 / 86_400_000.0;
        assert!((offset_days - est.days_to_reentry).abs() < 1e-6);
    }

    #[test]
    fn test_position_bounds() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..500 {
            let (lat, lon) = sample_position(51.6, &mut rng);
            assert!((-51.6..=51.6).contains(&lat));
            assert!((-180.0..=180.0).contains(&lon));
        }
        let (lat, _) = sample_position(0.0, &mut rng);
        assert_eq!(lat, 0.0);
        for _ in 0..100 {
            let (lat, _) = sample_position(170.0, &mut rng);
            assert!(lat.abs() <= 10.0);
        }
    }

    #[test]
    fn test_seeded_estimates_reproducible() {
        let r = record("X", 16.2, 0.0, 51.6);
        let a = estimate(&r, 500.0, now(), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = estimate(&r, 500.0, now(), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_official_source_origin() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut r = record("X", 16.2, 0.0, 51.6);
        r.source = RecordSource::OfficialPrediction;
        let est = estimate(&r, 500.0, now(), &mut rng).unwrap();
        assert_eq!(est.data_origin, DataOrigin::OfficialPrediction);
    }

    #[test]
    fn test_custom_model_thresholds() {
        let mut rng = StdRng::seed_from_u64(10);
        let model = DecayModel {
            min_mean_motion: 16.3,
            ..DecayModel::default()
        };
        let estimator = Estimator::new(500.0).with_model(model);
        assert!(estimator.estimate(&record("X", 16.2, 0.0, 51.6), now(), &mut rng).is_none());
        assert!(estimator.estimate(&record("X", 16.4, 0.0, 51.6), now(), &mut rng).is_some());
    }
}
