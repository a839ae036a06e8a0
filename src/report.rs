use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::collector::{AdapterState, AdapterStatus, RunReport};
use crate::fusion::{Candidate, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

const NAME_WIDTH: usize = 24;

pub fn render_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(width - 1).collect();
        short.push('~');
        short
    }
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}

fn header() -> String {
    format!(
        "{:>3}  {:<10} {:<w$} {:<19} {:<10} {:>7} {:>7} {:<16} {:<6} {:>7} {:>8}\n",
        "#",
        "NORAD",
        "NAME",
        "TYPE",
        "ORIGIN",
        "ALT km",
        "DAYS",
        "REENTRY (UTC)",
        "RISK",
        "LAT",
        "LON",
        w = NAME_WIDTH
    )
}

fn row(index: usize, entry: &Candidate, now: DateTime<Utc>) -> String {
    let estimate = entry.as_estimate();
    format!(
        "{:>3}  {:<10} {:<w$} {:<19} {:<10} {:>7} {:>7} {:<16} {:<6} {:>7} {:>8}\n",
        index + 1,
        entry.catalog_id().unwrap_or("-"),
        truncate(entry.object_name(), NAME_WIDTH),
        entry.type_label(),
        entry.data_origin().to_string(),
        opt(estimate.map(|e| e.altitude_km), 1),
        opt(entry.rank_days(now), 2),
        entry
            .expected_reentry()
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
        entry.risk_level().to_string(),
        opt(estimate.map(|e| e.estimated_latitude), 2),
        opt(estimate.map(|e| e.estimated_longitude), 2),
        w = NAME_WIDTH
    )
}

/// Candidate list as a fixed-width table, most urgent first.
pub fn render_entries(entries: &[Candidate], now: DateTime<Utc>) -> String {
    if entries.is_empty() {
        return "No reentry candidates.\n".to_string();
    }
    let mut out = header();
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&row(i, entry, now));
    }
    out
}

fn render_sources(sources: &[AdapterStatus]) -> String {
    let mut out = String::new();
    for status in sources {
        let c = &status.counts;
        let _ = match &status.state {
            AdapterState::Ok => writeln!(
                out,
                "  {:<20} {:<9} ok: {} accepted, {} official, {} malformed, {} rejected, {} filtered, {} over cap",
                status.source,
                status.priority,
                c.accepted,
                c.official,
                c.malformed,
                c.rejected,
                c.filtered,
                c.over_cap
            ),
            AdapterState::Unavailable { reason } => writeln!(
                out,
                "  {:<20} {:<9} unavailable: {}",
                status.source, status.priority, reason
            ),
        };
    }
    out
}

fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let join = |map: &std::collections::BTreeMap<String, usize>| {
        map.iter()
            .map(|(k, v)| format!("{k} {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let _ = writeln!(out, "  total: {}", summary.total);
    if summary.total == 0 {
        return out;
    }
    let _ = writeln!(out, "  risk: {}", join(&summary.by_risk));
    let _ = writeln!(out, "  type: {}", join(&summary.by_type));
    let _ = writeln!(out, "  origin: {}", join(&summary.by_origin));
    if let Some(alt) = &summary.altitude {
        let _ = writeln!(
            out,
            "  altitude: {:.1} / {:.1} / {:.1} km (min / mean / max)",
            alt.min_km, alt.mean_km, alt.max_km
        );
    }
    let _ = writeln!(out, "  inside region: {}", summary.inside_region);
    if let Some(next) = summary.next_reentry {
        let _ = writeln!(out, "  next reentry: {}", next.format("%Y-%m-%d %H:%M UTC"));
    }
    out
}

pub fn render_table(report: &RunReport) -> String {
    let mut out = format!(
        "Run {} at {}{}\n\n",
        report.run_id,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        if report.used_backup { " (backup data)" } else { "" }
    );
    out.push_str(&render_entries(&report.entries, report.generated_at));
    out.push_str("\nSources:\n");
    out.push_str(&render_sources(&report.sources));
    let _ = writeln!(
        out,
        "\nSummary ({} duplicates dropped, {} over caps):",
        report.duplicates, report.capped
    );
    out.push_str(&render_summary(&report.summary));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::RecordCounts;
    use crate::decay::{DataOrigin, Estimator, RiskLevel};
    use crate::elements::{OrbitalElementRecord, RecordSource};
    use crate::fusion::{OfficialPrediction, SourcePriority};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn entries() -> Vec<Candidate> {
        let record = OrbitalElementRecord {
            object_name: "A VERY LONG OBJECT NAME THAT OVERFLOWS".into(),
            catalog_id: Some("48000".into()),
            mean_motion: 16.2,
            eccentricity: 0.0,
            inclination: 53.0,
            source: RecordSource::Calculated,
        };
        let estimate = Estimator::default()
            .estimate(&record, now(), &mut StdRng::seed_from_u64(1))
            .unwrap();
        let official = OfficialPrediction {
            catalog_id: None,
            object_name: "CZ-5B R/B".into(),
            decay_epoch: None,
            window: None,
            risk_level: RiskLevel::Medium,
            data_origin: DataOrigin::OfficialPrediction,
        };
        vec![Candidate::Calculated(estimate), Candidate::Official(official)]
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("SHORT", 10), "SHORT");
        assert_eq!(truncate("ABCDEFGHIJK", 5), "ABCD~");
    }

    #[test]
    fn test_render_entries() {
        let table = render_entries(&entries(), now());
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("NORAD"));
        assert!(lines[1].contains("48000"));
        assert!(lines[1].contains("A VERY LONG OBJECT NAME~"));
        assert!(lines[1].contains("226.7"));
        assert!(lines[1].contains("Medium"));
        assert!(lines[2].contains("Official Prediction"));
        assert!(lines[2].contains("CZ-5B R/B"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_entries(&[], now()), "No reentry candidates.\n");
    }

    #[test]
    fn test_render_table_and_json() {
        let entries = entries();
        let report = RunReport {
            run_id: "test-run".into(),
            generated_at: now(),
            summary: Summary::from_entries(&entries),
            entries,
            sources: vec![
                AdapterStatus {
                    source: "celestrak".into(),
                    priority: SourcePriority::Secondary,
                    state: AdapterState::Ok,
                    counts: RecordCounts {
                        accepted: 1,
                        ..Default::default()
                    },
                },
                AdapterStatus {
                    source: "space-track".into(),
                    priority: SourcePriority::Primary,
                    state: AdapterState::Unavailable {
                        reason: "login failed".into(),
                    },
                    counts: RecordCounts::default(),
                },
            ],
            duplicates: 0,
            capped: 0,
            used_backup: false,
        };

        let table = render_table(&report);
        assert!(table.starts_with("Run test-run at 2026-10-18 00:00:00 UTC\n"));
        assert!(table.contains("unavailable: login failed"));
        assert!(table.contains("total: 2"));

        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(json["entries"].as_array().unwrap().len(), 2);
        assert_eq!(json["entries"][0]["data_origin"], "calculated_from_elements");
        assert_eq!(json["sources"][1]["state"]["status"], "unavailable");
    }
}
