mod classify;
mod constants;
mod estimator;
mod model;
mod types;

pub use classify::{classify, ClassificationRule, CLASSIFICATION_RULES};
pub use estimator::{altitude_km, estimate, Estimator, DEFAULT_ALTITUDE_CEILING_KM};
pub use model::{BandRule, DecayModel};
pub use types::{DataOrigin, DecayEstimate, ObjectType, RegionProximity, RiskLevel};
