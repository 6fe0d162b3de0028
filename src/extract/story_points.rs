use crate::model::RawIssue;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

pub const DEFAULT_FIELD: &str = "customfield_10016";

const CUSTOM_FIELD_PREFIX: &str = "customfield_";
const PARTIAL_PATTERNS: [&str; 4] = ["story points", "story point", "estimate", "sp"];
const EXCLUDED_TERMS: [&str; 7] = [
    "sprint", "response", "chart", "date", "time", "ready", "spec",
];

static EXACT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(story points?|story point estimate|points?)$").expect("valid regex")
});

/// One entry of `GET /rest/api/2/field`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FieldMeta {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionReason {
    Configured,
    ExactName,
    PartialName,
    NumericValue,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDetection {
    pub key: String,
    pub name: Option<String>,
    pub reason: DetectionReason,
}

impl FieldDetection {
    fn new(key: impl ToString, name: Option<String>, reason: DetectionReason) -> Self {
        Self {
            key: key.to_string(),
            name,
            reason,
        }
    }
}

/// Picks the custom field that most likely holds story points.
pub fn detect_field(metadata: &[FieldMeta], sample: &[RawIssue]) -> FieldDetection {
    let custom = || {
        metadata
            .iter()
            .filter(|field| field.id.starts_with(CUSTOM_FIELD_PREFIX))
    };

    let exact = custom().find(|field| EXACT_NAME.is_match(&field.name.to_lowercase()));
    if let Some(field) = exact {
        return FieldDetection::new(&field.id, Some(field.name.clone()), DetectionReason::ExactName);
    }

    let partial = custom().find(|field| {
        let name = field.name.to_lowercase();
        PARTIAL_PATTERNS.iter().any(|p| name.contains(p))
            && !EXCLUDED_TERMS.iter().any(|t| name.contains(t))
    });
    if let Some(field) = partial {
        return FieldDetection::new(
            &field.id,
            Some(field.name.clone()),
            DetectionReason::PartialName,
        );
    }

    let numeric = sample
        .iter()
        .flat_map(|issue| issue.fields())
        .filter(|(key, value)| {
            key.starts_with(CUSTOM_FIELD_PREFIX) && value.as_f64().is_some_and(|v| v > 0.0)
        })
        .map(|(key, _)| key.clone())
        .min();
    if let Some(key) = numeric {
        let name = metadata
            .iter()
            .find(|field| field.id == key)
            .map(|field| field.name.clone());
        return FieldDetection::new(key, name, DetectionReason::NumericValue);
    }

    FieldDetection::new(DEFAULT_FIELD, None, DetectionReason::Default)
}

/// Parses the field metadata payload, ignoring entries that are not objects.
pub fn parse_metadata(payload: &Value) -> Vec<FieldMeta> {
    payload
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|field| serde_json::from_value(field.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
