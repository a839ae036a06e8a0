use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Candidate, SourceBatch, SourcePriority};

/// Per-priority caps applied to each batch before merging, plus an optional
/// cap on the final list. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionLimits {
    pub official: Option<usize>,
    pub primary: Option<usize>,
    pub secondary: Option<usize>,
    pub backup: Option<usize>,
    pub max_results: Option<usize>,
}

impl Default for FusionLimits {
    fn default() -> Self {
        Self {
            official: None,
            primary: Some(10),
            secondary: Some(15),
            backup: Some(20),
            max_results: None,
        }
    }
}

impl FusionLimits {
    pub fn unbounded() -> Self {
        Self {
            official: None,
            primary: None,
            secondary: None,
            backup: None,
            max_results: None,
        }
    }

    pub fn cap(&self, priority: SourcePriority) -> Option<usize> {
        match priority {
            SourcePriority::Official => self.official,
            SourcePriority::Primary => self.primary,
            SourcePriority::Secondary => self.secondary,
            SourcePriority::Backup => self.backup,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    pub entries: Vec<Candidate>,
    /// Entries dropped because a higher-priority source already had the object.
    pub duplicates: usize,
    /// Entries dropped by the per-source and final caps.
    pub capped: usize,
}

/// Catalog ids that cannot identify an object are treated as absent.
pub fn dedup_key(candidate: &Candidate) -> Option<&str> {
    candidate
        .catalog_id()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter(|id| !id.eq_ignore_ascii_case("n/a") && !id.eq_ignore_ascii_case("unknown"))
}

fn by_urgency(now: DateTime<Utc>) -> impl Fn(&Candidate, &Candidate) -> Ordering {
    move |a, b| match (a.rank_days(now), b.rank_days(now)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Merge batches into one ranked list.
///
/// Batches are visited in priority order (ties keep their given order).
/// Calculated batches are ranked soonest-first before their cap is applied;
/// official batches keep the order the source published. The first entry seen
/// for a catalog id wins; entries without a usable id are always kept. The
/// merged list is ranked by urgency with entries lacking any timing last.
pub fn fuse(mut batches: Vec<SourceBatch>, limits: &FusionLimits, now: DateTime<Utc>) -> FusionOutcome {
    batches.sort_by_key(|b| b.priority);

    let rank = by_urgency(now);
    let mut seen: HashSet<String> = HashSet::new();
    let mut entries = Vec::new();
    let mut duplicates = 0;
    let mut capped = 0;

    for mut batch in batches {
        if batch.priority != SourcePriority::Official {
            batch.candidates.sort_by(&rank);
        }
        if let Some(cap) = limits.cap(batch.priority) {
            if batch.candidates.len() > cap {
                capped += batch.candidates.len() - cap;
                batch.candidates.truncate(cap);
            }
        }

        for candidate in batch.candidates {
            if let Some(key) = dedup_key(&candidate) {
                if !seen.insert(key.to_string()) {
                    log::debug!(
                        "dropping duplicate {} ({}) from {}",
                        key,
                        candidate.object_name(),
                        batch.source
                    );
                    duplicates += 1;
                    continue;
                }
            }
            entries.push(candidate);
        }
    }

    entries.sort_by(&rank);

    if let Some(max) = limits.max_results {
        if entries.len() > max {
            capped += entries.len() - max;
            entries.truncate(max);
        }
    }

    FusionOutcome {
        entries,
        duplicates,
        capped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::{DataOrigin, DecayEstimate, ObjectType, RiskLevel};
    use crate::fusion::OfficialPrediction;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn calc(id: Option<&str>, name: &str, days: f64) -> Candidate {
        Candidate::Calculated(DecayEstimate {
            catalog_id: id.map(String::from),
            object_name: name.into(),
            mean_motion: 16.2,
            eccentricity: 0.0,
            inclination: 51.6,
            altitude_km: 220.0,
            days_to_reentry: days,
            estimated_reentry_time: now() + Duration::hours((days * 24.0) as i64),
            estimated_latitude: 0.0,
            estimated_longitude: 0.0,
            object_type: ObjectType::Satellite,
            size_estimate: "1–5m".into(),
            mass_estimate: "100–1000 kg".into(),
            risk_level: RiskLevel::Medium,
            data_origin: DataOrigin::CalculatedFromElements,
            region: None,
        })
    }

    fn official(id: &str, name: &str, days: Option<i64>) -> Candidate {
        Candidate::Official(OfficialPrediction {
            catalog_id: Some(id.into()),
            object_name: name.into(),
            decay_epoch: days.map(|d| now() + Duration::days(d)),
            window: None,
            risk_level: RiskLevel::Medium,
            data_origin: DataOrigin::OfficialPrediction,
        })
    }

    fn names(outcome: &FusionOutcome) -> Vec<&str> {
        outcome.entries.iter().map(|c| c.object_name()).collect()
    }

    #[test]
    fn test_higher_priority_wins_duplicate() {
        let batches = vec![
            SourceBatch::new("celestrak", SourcePriority::Secondary, vec![calc(Some("100"), "SECONDARY", 1.0)]),
            SourceBatch::new("space-track", SourcePriority::Primary, vec![calc(Some("100"), "PRIMARY", 5.0)]),
        ];
        let outcome = fuse(batches, &FusionLimits::unbounded(), now());
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(names(&outcome), vec!["PRIMARY"]);
        assert_eq!(outcome.entries[0].rank_days(now()), Some(5.0));
        assert_eq!(outcome.duplicates, 1);
    }

    #[test]
    fn test_official_beats_calculated() {
        let batches = vec![
            SourceBatch::new("calc", SourcePriority::Primary, vec![calc(Some("7"), "CALC", 0.5)]),
            SourceBatch::new("official", SourcePriority::Official, vec![official("7", "OFFICIAL", Some(3))]),
        ];
        let outcome = fuse(batches, &FusionLimits::default(), now());
        assert_eq!(outcome.entries.len(), 1);
        assert!(matches!(outcome.entries[0], Candidate::Official(_)));
    }

    #[test]
    fn test_missing_ids_never_deduplicated() {
        let batches = vec![
            SourceBatch::new("a", SourcePriority::Primary, vec![calc(None, "A", 1.0), calc(Some("N/A"), "B", 2.0)]),
            SourceBatch::new("b", SourcePriority::Secondary, vec![calc(None, "C", 1.0), calc(Some(" "), "D", 3.0)]),
        ];
        let outcome = fuse(batches, &FusionLimits::unbounded(), now());
        assert_eq!(outcome.entries.len(), 4);
        assert_eq!(outcome.duplicates, 0);
    }

    #[test]
    fn test_output_never_larger_than_input() {
        let input = vec![
            calc(Some("1"), "A", 3.0),
            calc(Some("2"), "B", 1.0),
            calc(None, "C", 2.0),
        ];
        let outcome = fuse(
            vec![SourceBatch::new("a", SourcePriority::Primary, input.clone())],
            &FusionLimits::unbounded(),
            now(),
        );
        assert_eq!(outcome.entries.len(), input.len());

        let with_dupes = fuse(
            vec![
                SourceBatch::new("a", SourcePriority::Primary, input.clone()),
                SourceBatch::new("b", SourcePriority::Secondary, input.clone()),
            ],
            &FusionLimits::unbounded(),
            now(),
        );
        // the id-less entry survives from both batches
        assert_eq!(with_dupes.entries.len(), 4);
        assert_eq!(with_dupes.duplicates, 2);
        assert!(with_dupes.entries.len() < input.len() * 2);
    }

    #[test]
    fn test_ranked_soonest_first() {
        let batches = vec![
            SourceBatch::new("a", SourcePriority::Primary, vec![calc(Some("1"), "LATE", 9.0), calc(Some("2"), "SOON", 0.2)]),
            SourceBatch::new(
                "official",
                SourcePriority::Official,
                vec![official("3", "NO_EPOCH", None), official("4", "MID", Some(2))],
            ),
        ];
        let outcome = fuse(batches, &FusionLimits::unbounded(), now());
        assert_eq!(names(&outcome), vec!["SOON", "MID", "LATE", "NO_EPOCH"]);
    }

    #[test]
    fn test_cap_keeps_soonest_per_source() {
        let batch: Vec<_> = (0..30)
            .map(|i| calc(Some(&i.to_string()), &format!("OBJ{i}"), 30.0 - i as f64))
            .collect();
        let outcome = fuse(
            vec![SourceBatch::new("a", SourcePriority::Primary, batch)],
            &FusionLimits::default(),
            now(),
        );
        assert_eq!(outcome.entries.len(), 10);
        assert_eq!(outcome.capped, 20);
        // soonest is OBJ29 at 1 day
        assert_eq!(outcome.entries[0].object_name(), "OBJ29");
        assert_eq!(outcome.entries[9].object_name(), "OBJ20");
    }

    #[test]
    fn test_cap_applies_before_dedupe() {
        // The secondary source's soonest entry duplicates a primary one, so the
        // secondary contributes fewer than its cap.
        let primary = vec![calc(Some("1"), "P1", 1.0)];
        let secondary = vec![calc(Some("1"), "S1", 0.5), calc(Some("2"), "S2", 2.0), calc(Some("3"), "S3", 3.0)];
        let limits = FusionLimits {
            secondary: Some(2),
            ..FusionLimits::unbounded()
        };
        let outcome = fuse(
            vec![
                SourceBatch::new("p", SourcePriority::Primary, primary),
                SourceBatch::new("s", SourcePriority::Secondary, secondary),
            ],
            &limits,
            now(),
        );
        assert_eq!(names(&outcome), vec!["P1", "S2"]);
        assert_eq!(outcome.capped, 1);
        assert_eq!(outcome.duplicates, 1);
    }

    #[test]
    fn test_official_order_preserved_before_cap() {
        let limits = FusionLimits {
            official: Some(1),
            ..FusionLimits::unbounded()
        };
        let batch = vec![official("1", "FIRST", Some(5)), official("2", "SECOND", Some(1))];
        let outcome = fuse(
            vec![SourceBatch::new("o", SourcePriority::Official, batch)],
            &limits,
            now(),
        );
        assert_eq!(names(&outcome), vec!["FIRST"]);
    }

    #[test]
    fn test_max_results() {
        let limits = FusionLimits {
            max_results: Some(2),
            ..FusionLimits::unbounded()
        };
        let batch = vec![calc(Some("1"), "A", 3.0), calc(Some("2"), "B", 1.0), calc(Some("3"), "C", 2.0)];
        let outcome = fuse(vec![SourceBatch::new("a", SourcePriority::Primary, batch)], &limits, now());
        assert_eq!(names(&outcome), vec!["B", "C"]);
        assert_eq!(outcome.capped, 1);
    }

    #[test]
    fn test_empty_batches() {
        let outcome = fuse(
            vec![
                SourceBatch::new("a", SourcePriority::Primary, vec![]),
                SourceBatch::new("b", SourcePriority::Secondary, vec![calc(Some("1"), "ONLY", 1.0)]),
            ],
            &FusionLimits::default(),
            now(),
        );
        assert_eq!(names(&outcome), vec!["ONLY"]);
        assert!(fuse(vec![], &FusionLimits::default(), now()).entries.is_empty());
    }
}
