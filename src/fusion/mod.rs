mod pipeline;
mod region;
mod summary;
mod types;

pub use pipeline::{dedup_key, fuse, FusionLimits, FusionOutcome};
pub use region::Region;
pub use summary::{AltitudeStats, Summary};
pub use types::{Candidate, OfficialPrediction, SourceBatch, SourcePriority};
