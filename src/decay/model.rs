use serde::{Deserialize, Serialize};

use super::types::RiskLevel;

/// Lifetime rule for one altitude band: `max(floor_days, altitude_km / divisor)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandRule {
    pub divisor: f64,
    pub floor_days: f64,
}

impl BandRule {
    pub fn days(&self, altitude_km: f64) -> f64 {
        (altitude_km / self.divisor).max(self.floor_days)
    }
}

/// Heuristic constants of the decay estimate.
///
/// None of these have a physical derivation; they are tuned for a monitoring
/// dashboard and every one of them can be overridden from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayModel {
    /// Orbits at or below this mean motion (rev/day) are never candidates.
    pub min_mean_motion: f64,
    /// Upper bound (exclusive) of the low band, km.
    pub low_band_upper_km: f64,
    /// Upper bound (exclusive) of the middle band, km.
    pub mid_band_upper_km: f64,
    pub low_band: BandRule,
    pub mid_band: BandRule,
    pub high_band: BandRule,
    pub eccentricity_weight: f64,
    /// Floor applied after the eccentricity correction.
    pub min_days: f64,
    pub risk_high_below_km: f64,
    pub risk_medium_below_km: f64,
}

impl Default for DecayModel {
    fn default() -> Self {
        Self {
            min_mean_motion: 11.0,
            low_band_upper_km: 200.0,
            mid_band_upper_km: 300.0,
            low_band: BandRule {
                divisor: 50.0,
                floor_days: 0.1,
            },
            mid_band: BandRule {
                divisor: 30.0,
                floor_days: 1.0,
            },
            high_band: BandRule {
                divisor: 20.0,
                floor_days: 7.0,
            },
            eccentricity_weight: 0.5,
            min_days: 0.1,
            risk_high_below_km: 150.0,
            risk_medium_below_km: 250.0,
        }
    }
}

impl DecayModel {
    pub fn base_days(&self, altitude_km: f64) -> f64 {
        if altitude_km < self.low_band_upper_km {
            self.low_band.days(altitude_km)
        } else if altitude_km < self.mid_band_upper_km {
            self.mid_band.days(altitude_km)
        } else {
            self.high_band.days(altitude_km)
        }
    }

    /// Elliptical orbits lose energy faster at perigee.
    pub fn eccentricity_factor(&self, eccentricity: f64) -> f64 {
        1.0 - eccentricity * self.eccentricity_weight
    }

    pub fn days_to_reentry(&self, altitude_km: f64, eccentricity: f64) -> f64 {
        (self.base_days(altitude_km) * self.eccentricity_factor(eccentricity)).max(self.min_days)
    }

    pub fn risk_level(&self, altitude_km: f64) -> RiskLevel {
        if altitude_km < self.risk_high_below_km {
            RiskLevel::High
        } else if altitude_km < self.risk_medium_below_km {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}
