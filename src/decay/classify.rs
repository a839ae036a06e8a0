use super::types::ObjectType;

/// An object name containing any of `keywords` (case-insensitive) gets
/// `object_type`.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub keywords: &'static [&'static str],
    pub object_type: ObjectType,
}

impl ClassificationRule {
    pub fn matches(&self, upper_name: &str) -> bool {
        self.keywords.iter().any(|k| upper_name.contains(k))
    }
}

/// Evaluated in order, first match wins. Anything unmatched is a satellite.
pub const CLASSIFICATION_RULES: [ClassificationRule; 2] = [
    ClassificationRule {
        keywords: &["R/B", "ROCKET", "BOOSTER"],
        object_type: ObjectType::RocketBody,
    },
    ClassificationRule {
        keywords: &["DEB", "DEBRIS"],
        object_type: ObjectType::Debris,
    },
];

pub fn classify(object_name: &str) -> ObjectType {
    classify_with(&CLASSIFICATION_RULES, object_name)
}

pub fn classify_with(rules: &[ClassificationRule], object_name: &str) -> ObjectType {
    let upper = object_name.to_uppercase();
    rules
        .iter()
        .find(|rule| rule.matches(&upper))
        .map(|rule| rule.object_type)
        .unwrap_or(ObjectType::Satellite)
}

/// Categorical (size, mass) ranges for a classification.
pub fn physical_estimates(object_type: ObjectType) -> (&'static str, &'static str) {
    match object_type {
        ObjectType::RocketBody => ("8–15m", "2000–5000 kg"),
        ObjectType::Debris => ("0.5–2m", "10–100 kg"),
        ObjectType::Satellite => ("1–5m", "100–1000 kg"),
    }
}
