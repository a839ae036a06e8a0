use sgp4::Elements;

use super::error::ElementsError;
use super::raw::{RawElementRecord, Scalar};

/// Parse TLE text (2- or 3-line sets, any number of them) into raw records.
///
/// Sets that fail to parse are returned alongside the good ones so the caller
/// can count them.
pub fn parse_tle_text(content: &str) -> (Vec<RawElementRecord>, Vec<ElementsError>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (name, line1, line2) in split_tle_sets(content) {
        match Elements::from_tle(name, line1.as_bytes(), line2.as_bytes()) {
            Ok(elements) => records.push(raw_from_elements(&elements)),
            Err(e) => errors.push(ElementsError::from(e)),
        }
    }

    (records, errors)
}

fn raw_from_elements(elements: &Elements) -> RawElementRecord {
    RawElementRecord {
        object_name: elements.object_name.clone(),
        norad_cat_id: Some(Scalar::Integer(elements.norad_id as i64)),
        mean_motion: Some(Scalar::Number(elements.mean_motion)),
        eccentricity: Some(Scalar::Number(elements.eccentricity)),
        inclination: Some(Scalar::Number(elements.inclination)),
    }
}

fn split_tle_sets(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            let name = lines[i].strip_prefix("0 ").unwrap_or(lines[i]);
            result.push((
                Some(name.to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    #[test]
    fn test_three_line_set() {
        let (records, errors) = parse_tle_text(ISS_TLE);
        assert!(errors.is_empty());
        assert_eq!(records.len(), 1);
        let raw = &records[0];
        assert_eq!(raw.object_name.as_deref(), Some("ISS (ZARYA)"));
        assert_eq!(raw.norad_cat_id, Some(Scalar::Integer(25544)));
        assert!((raw.mean_motion_hint().unwrap() - 15.49507896).abs() < 1e-6);
    }

    #[test]
    fn test_two_line_set_and_garbage() {
        let content = format!(
            "{}\n\ntrailing garbage\n",
            ISS_TLE.lines().skip(1).collect::<Vec<_>>().join("\n")
        );
        let (records, errors) = parse_tle_text(&content);
        assert!(errors.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].object_name, None);
    }

    #[test]
    fn test_unparseable_set_reported() {
        let broken = ISS_TLE.replace("51.6461", "5x.6461");
        let (records, errors) = parse_tle_text(&broken);
        assert!(records.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ElementsError::InvalidTle(_)));
    }
}
