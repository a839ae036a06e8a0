use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::{Config, ConfigError};
use crate::decay::{Estimator, ObjectType};
use crate::elements::{RawDecayPrediction, RawElementRecord, RecordSource};
use crate::fusion::{
    fuse, Candidate, FusionLimits, OfficialPrediction, Region, SourceBatch, SourcePriority, Summary,
};
use crate::sources::{BackupSource, CelesTrak, SourceAdapter, SourceError, SpaceTrack, TleDirectory};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Everything that shapes a run besides the sources themselves.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub estimator: Estimator,
    pub horizon_days: u32,
    pub limits: FusionLimits,
    pub include_rocket_bodies: bool,
    pub include_debris: bool,
    pub region: Option<Region>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            estimator: Estimator::default(),
            horizon_days: 7,
            limits: FusionLimits::default(),
            include_rocket_bodies: true,
            include_debris: true,
            region: None,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            estimator: config.estimator(),
            horizon_days: config.pipeline.horizon_days,
            limits: config.limits,
            include_rocket_bodies: config.pipeline.include_rocket_bodies,
            include_debris: config.pipeline.include_debris,
            region: Some(config.region.clone()),
        }
    }

    fn admits(&self, object_type: ObjectType) -> bool {
        match object_type {
            ObjectType::RocketBody => self.include_rocket_bodies,
            ObjectType::Debris => self.include_debris,
            ObjectType::Satellite => true,
        }
    }
}

pub struct ConfiguredSource {
    pub adapter: Box<dyn SourceAdapter>,
    pub priority: SourcePriority,
    /// Raw records considered before estimation.
    pub raw_cap: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdapterState {
    Ok,
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct RecordCounts {
    pub raw: usize,
    pub over_cap: usize,
    pub malformed: usize,
    pub rejected: usize,
    pub filtered: usize,
    pub accepted: usize,
    pub official: usize,
    pub official_before_now: usize,
    pub official_beyond_horizon: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdapterStatus {
    pub source: String,
    pub priority: SourcePriority,
    pub state: AdapterState,
    pub counts: RecordCounts,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RunReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<Candidate>,
    pub sources: Vec<AdapterStatus>,
    pub summary: Summary,
    pub duplicates: usize,
    pub capped: usize,
    pub used_backup: bool,
}

impl RunReport {
    pub fn available_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| s.state == AdapterState::Ok)
            .count()
    }
}

struct Fetched {
    official: Result<Option<Vec<RawDecayPrediction>>, SourceError>,
    elements: Result<Vec<RawElementRecord>, SourceError>,
}

async fn fetch(source: &ConfiguredSource, horizon_days: u32) -> Fetched {
    let official = source.adapter.fetch_official_predictions(horizon_days).await;
    let elements = source.adapter.fetch_elements().await;
    Fetched { official, elements }
}

/// Runs the whole pipeline: fetch from every source, estimate, fuse.
pub struct Collector {
    sources: Vec<ConfiguredSource>,
    backup: Option<ConfiguredSource>,
    options: PipelineOptions,
}

impl Collector {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            sources: Vec::new(),
            backup: None,
            options,
        }
    }

    pub fn with_source(
        mut self,
        adapter: Box<dyn SourceAdapter>,
        priority: SourcePriority,
        raw_cap: Option<usize>,
    ) -> Self {
        self.sources.push(ConfiguredSource {
            adapter,
            priority,
            raw_cap,
        });
        self
    }

    /// Source consulted only when every other source together yields nothing.
    pub fn with_backup(mut self, adapter: Box<dyn SourceAdapter>) -> Self {
        self.backup = Some(ConfiguredSource {
            adapter,
            priority: SourcePriority::Backup,
            raw_cap: None,
        });
        self
    }

    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let (space_track_timeout, celestrak_timeout) = config.request_timeouts()?;
        let mut collector = Collector::new(PipelineOptions::from_config(config));

        if let (Some(st), Some(timeout)) = (&config.sources.space_track, space_track_timeout) {
            collector = collector.with_source(
                Box::new(SpaceTrack::new(st, timeout)?),
                SourcePriority::Primary,
                config.raw_limits.cap(SourcePriority::Primary),
            );
        }
        if config.sources.celestrak.enabled {
            collector = collector.with_source(
                Box::new(CelesTrak::new(&config.sources.celestrak, celestrak_timeout)?),
                SourcePriority::Secondary,
                config.raw_limits.cap(SourcePriority::Secondary),
            );
        }
        if let Some(dir) = &config.sources.tle_directory {
            collector = collector.with_source(
                Box::new(TleDirectory::new(dir.path.clone())),
                dir.priority,
                config.raw_limits.cap(dir.priority),
            );
        }
        if config.pipeline.use_backup_data {
            collector = collector.with_backup(Box::new(BackupSource::new(
                config.pipeline.backup_count,
                config.pipeline.seed,
            )));
        }

        Ok(collector)
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.adapter.name()).collect()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub async fn run<R: Rng + Send>(&self, now: DateTime<Utc>, rng: &mut R) -> RunReport {
        let run_id = uuid::Uuid::new_v4().to_string();
        if self.sources.is_empty() {
            log::warn!("run {}: no sources configured", run_id);
        }

        // Sources are independent; fetch them concurrently, then estimate and
        // fuse on this task alone.
        let horizon = self.options.horizon_days;
        let fetched = join_all(self.sources.iter().map(|s| fetch(s, horizon))).await;

        let mut batches = Vec::new();
        let mut statuses = Vec::new();
        for (source, fetched) in self.sources.iter().zip(fetched) {
            let (source_batches, status) = self.process(source, fetched, now, rng);
            batches.extend(source_batches);
            statuses.push(status);
        }

        let mut outcome = fuse(batches, &self.options.limits, now);
        let mut used_backup = false;

        if outcome.entries.is_empty() {
            if let Some(backup) = &self.backup {
                log::info!("run {}: no candidates from live sources, using backup data", run_id);
                let fetched = fetch(backup, horizon).await;
                let (backup_batches, status) = self.process(backup, fetched, now, rng);
                statuses.push(status);
                outcome = fuse(backup_batches, &self.options.limits, now);
                used_backup = true;
            }
        }

        let summary = Summary::from_entries(&outcome.entries);
        log::info!(
            "run {}: {} candidates ({} duplicates dropped, {} over caps) from {} sources",
            run_id,
            outcome.entries.len(),
            outcome.duplicates,
            outcome.capped,
            statuses.len()
        );

        RunReport {
            run_id,
            generated_at: now,
            entries: outcome.entries,
            sources: statuses,
            summary,
            duplicates: outcome.duplicates,
            capped: outcome.capped,
            used_backup,
        }
    }

    fn process<R: Rng + ?Sized>(
        &self,
        source: &ConfiguredSource,
        fetched: Fetched,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> (Vec<SourceBatch>, AdapterStatus) {
        let name = source.adapter.name().to_string();
        let mut counts = RecordCounts::default();
        let mut failures = Vec::new();
        let mut batches = Vec::new();

        match fetched.official {
            Ok(Some(raw)) => {
                let window = official_candidates(&raw, now, self.options.horizon_days);
                counts.official = window.candidates.len();
                counts.official_before_now = window.before_now;
                counts.official_beyond_horizon = window.beyond_horizon;
                batches.push(SourceBatch::new(
                    name.clone(),
                    SourcePriority::Official,
                    window.candidates,
                ));
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("{}: official predictions unavailable: {}", name, e);
                failures.push(e.to_string());
            }
        }

        match fetched.elements {
            Ok(raw) => {
                let record_source = match source.priority {
                    SourcePriority::Official => RecordSource::OfficialPrediction,
                    _ => RecordSource::Calculated,
                };
                let candidates =
                    self.estimate_all(&raw, source.raw_cap, record_source, now, rng, &mut counts);
                batches.push(SourceBatch::new(name.clone(), source.priority, candidates));
            }
            Err(e) => {
                log::warn!("{}: element sets unavailable: {}", name, e);
                failures.push(e.to_string());
            }
        }

        log::debug!("{}: {:?}", name, counts);

        let state = if failures.is_empty() {
            AdapterState::Ok
        } else {
            AdapterState::Unavailable {
                reason: failures.join("; "),
            }
        };

        let status = AdapterStatus {
            source: name,
            priority: source.priority,
            state,
            counts,
        };
        (batches, status)
    }

    fn estimate_all<R: Rng + ?Sized>(
        &self,
        raw: &[RawElementRecord],
        raw_cap: Option<usize>,
        record_source: RecordSource,
        now: DateTime<Utc>,
        rng: &mut R,
        counts: &mut RecordCounts,
    ) -> Vec<Candidate> {
        counts.raw = raw.len();
        let take = raw_cap.unwrap_or(raw.len()).min(raw.len());
        counts.over_cap = raw.len() - take;

        let mut candidates = Vec::new();
        for raw_record in &raw[..take] {
            let record = match raw_record.to_record(record_source) {
                Ok(record) => record,
                Err(e) => {
                    log::debug!("skipping malformed record {:?}: {}", raw_record.object_name, e);
                    counts.malformed += 1;
                    continue;
                }
            };

            let Some(mut estimate) = self.options.estimator.estimate(&record, now, rng) else {
                counts.rejected += 1;
                continue;
            };

            if !self.options.admits(estimate.object_type) {
                counts.filtered += 1;
                continue;
            }

            if let Some(region) = &self.options.region {
                estimate.region = Some(region.proximity(&estimate));
            }
            counts.accepted += 1;
            candidates.push(Candidate::Calculated(estimate));
        }
        candidates
    }
}

/// Official predictions that fall inside `[now, now + horizon]`.
#[derive(Debug, Default)]
pub struct OfficialWindow {
    pub candidates: Vec<Candidate>,
    /// Already decayed; the feed reaches back a full horizon.
    pub before_now: usize,
    pub beyond_horizon: usize,
}

/// Convert official rows, dropping those whose decay epoch has passed or lies
/// past the horizon. Rows without a readable epoch are kept.
pub fn official_candidates(
    raw: &[RawDecayPrediction],
    now: DateTime<Utc>,
    horizon_days: u32,
) -> OfficialWindow {
    let limit = now + Duration::days(i64::from(horizon_days));
    let mut window = OfficialWindow::default();

    for prediction in raw.iter().map(OfficialPrediction::from_raw) {
        match prediction.decay_epoch {
            Some(epoch) if epoch < now => window.before_now += 1,
            Some(epoch) if epoch > limit => window.beyond_horizon += 1,
            _ => window.candidates.push(Candidate::Official(prediction)),
        }
    }
    window
}
