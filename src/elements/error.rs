use thiserror::Error;

/// A single raw record that could not be turned into an [`OrbitalElementRecord`].
///
/// These are always recovered at record granularity: the record is skipped and
/// counted, never propagated to the caller of a pipeline run.
///
/// [`OrbitalElementRecord`]: super::OrbitalElementRecord
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ElementsError {
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("field {field} is not numeric: {value:?}")]
    NotNumeric { field: &'static str, value: String },
    #[error("field {field} is not finite")]
    NotFinite { field: &'static str },
    #[error("eccentricity {0} outside [0, 1)")]
    Eccentricity(f64),
    #[error("inclination {0} outside [0, 180]")]
    Inclination(f64),
    #[error("invalid TLE: {0}")]
    InvalidTle(String),
}

impl From<sgp4::TleError> for ElementsError {
    fn from(err: sgp4::TleError) -> Self {
        ElementsError::InvalidTle(err.to_string())
    }
}
