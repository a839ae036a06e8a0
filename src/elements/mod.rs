mod error;
mod raw;
mod tle;
mod types;

pub use error::ElementsError;
pub use raw::{parse_epoch, RawDecayPrediction, RawElementRecord, Scalar};
pub use tle::parse_tle_text;
pub use types::{OrbitalElementRecord, RecordSource};

#[cfg(test)]
pub(crate) use tle::tests::ISS_TLE;
