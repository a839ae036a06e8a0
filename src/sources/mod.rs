mod backup;
mod celestrak;
mod error;
mod http;
mod space_track;
mod tle_dir;

use async_trait::async_trait;

use crate::elements::{RawDecayPrediction, RawElementRecord};

pub use backup::BackupSource;
pub use celestrak::CelesTrak;
pub use error::SourceError;
pub use space_track::SpaceTrack;
pub use tle_dir::TleDirectory;

/// A provider of raw orbital data.
///
/// Implementations own their transport concerns (timeouts, retries, auth).
/// "No data" is an empty `Vec`, never an error.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_elements(&self) -> Result<Vec<RawElementRecord>, SourceError>;

    /// Official decay predictions up to `horizon_days` out. `Ok(None)` means
    /// this source has no official capability at all.
    async fn fetch_official_predictions(
        &self,
        _horizon_days: u32,
    ) -> Result<Option<Vec<RawDecayPrediction>>, SourceError> {
        Ok(None)
    }
}
