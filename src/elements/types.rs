use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::ElementsError;

/// Which kind of provider a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    OfficialPrediction,
    Calculated,
}

/// Normalized orbital elements of one tracked object, as reported by one source.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrbitalElementRecord {
    pub object_name: String,
    /// NORAD catalog number; `None` means the record can never be deduplicated.
    pub catalog_id: Option<String>,
    /// Revolutions per day.
    pub mean_motion: f64,
    pub eccentricity: f64,
    /// Degrees.
    pub inclination: f64,
    pub source: RecordSource,
}

impl OrbitalElementRecord {
    /// Field-level sanity checks.
    ///
    /// A non-positive mean motion passes: it is a rejection decided by the
    /// estimator, not a malformed record.
    pub fn validate(&self) -> Result<(), ElementsError> {
        for (field, value) in [
            ("MEAN_MOTION", self.mean_motion),
            ("ECCENTRICITY", self.eccentricity),
            ("INCLINATION", self.inclination),
        ] {
            if !value.is_finite() {
                return Err(ElementsError::NotFinite { field });
            }
        }

        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(ElementsError::Eccentricity(self.eccentricity));
        }
        if !(0.0..=180.0).contains(&self.inclination) {
            return Err(ElementsError::Inclination(self.inclination));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mean_motion: f64, eccentricity: f64, inclination: f64) -> OrbitalElementRecord {
        OrbitalElementRecord {
            object_name: "TEST".into(),
            catalog_id: Some("1".into()),
            mean_motion,
            eccentricity,
            inclination,
            source: RecordSource::Calculated,
        }
    }

    #[test]
    fn test_valid_record() {
        assert_eq!(record(15.5, 0.001, 51.6).validate(), Ok(()));
    }

    #[test]
    fn test_non_positive_mean_motion_is_not_malformed() {
        assert!(record(0.0, 0.0, 51.6).validate().is_ok());
        assert!(record(-3.0, 0.0, 51.6).validate().is_ok());
    }

    #[test]
    fn test_eccentricity_bounds() {
        assert!(record(15.5, 0.0, 51.6).validate().is_ok());
        assert_eq!(
            record(15.5, 1.0, 51.6).validate(),
            Err(ElementsError::Eccentricity(1.0))
        );
        assert!(record(15.5, -0.1, 51.6).validate().is_err());
    }

    #[test]
    fn test_inclination_bounds() {
        assert!(record(15.5, 0.0, 180.0).validate().is_ok());
        assert_eq!(
            record(15.5, 0.0, 181.0).validate(),
            Err(ElementsError::Inclination(181.0))
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(
            record(f64::NAN, 0.0, 51.6).validate(),
            Err(ElementsError::NotFinite {
                field: "MEAN_MOTION"
            })
        );
        assert!(record(15.5, 0.0, f64::INFINITY).validate().is_err());
    }
}
