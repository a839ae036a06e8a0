use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::elements::{RawElementRecord, Scalar};

use super::error::SourceError;
use super::SourceAdapter;

const ROCKET_NAMES: &[&str] = &[
    "FALCON 9 R/B",
    "ATLAS 5 CENTAUR R/B",
    "DELTA 4 R/B",
    "ARIANE 5 R/B",
    "PROTON-M R/B",
    "LONG MARCH 3B R/B",
    "SOYUZ-2 FREGAT R/B",
    "H-IIA R/B",
];

const DEBRIS_NAMES: &[&str] = &[
    "SL-16 DEB",
    "CZ-3B DEB",
    "ARIANE DEB",
    "DELTA DEB",
    "COSMOS DEB",
    "UNKNOWN DEB",
];

const SATELLITE_NAMES: &[&str] = &["STARLINK", "COSMOS", "IRIDIUM", "SPOT", "TERRASAR", "ENVISAT"];

/// Synthetic low-orbit element sets used when no real source produced
/// anything. Catalog ids are prefixed `DEMO-` so they never collide with real
/// objects.
pub struct BackupSource {
    count: usize,
    seed: Option<u64>,
}

impl BackupSource {
    pub fn new(count: usize, seed: Option<u64>) -> Self {
        Self { count, seed }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<RawElementRecord> {
        (0..self.count)
            .map(|i| {
                // 40% rocket bodies, 30% debris, the rest satellites
                let pool = match i * 10 / self.count.max(1) {
                    0..=3 => ROCKET_NAMES,
                    4..=6 => DEBRIS_NAMES,
                    _ => SATELLITE_NAMES,
                };
                let base = pool.choose(rng).copied().unwrap_or("UNKNOWN");
                let catalog = 40_000 + i;

                RawElementRecord {
                    object_name: Some(format!("{base} ({catalog})")),
                    norad_cat_id: Some(Scalar::Text(format!("DEMO-{catalog}"))),
                    // roughly 120-330 km
                    mean_motion: Some(Scalar::Number(rng.random_range(15.85..16.6))),
                    eccentricity: Some(Scalar::Number(rng.random_range(0.0..0.01))),
                    inclination: Some(Scalar::Number(rng.random_range(40.0..98.0))),
                }
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for BackupSource {
    fn name(&self) -> &str {
        "backup"
    }

    async fn fetch_elements(&self) -> Result<Vec<RawElementRecord>, SourceError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(self.generate(&mut rng))
    }
}
