use crate::model::RawIssue;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;

pub const UNASSIGNED: &str = "Unassigned";
pub const UNKNOWN: &str = "Unknown";
pub const DONE_CATEGORY: &str = "done";

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub fn assignee_of(issue: &RawIssue) -> String {
    let Some(assignee) = issue.field("assignee") else {
        return UNASSIGNED.to_string();
    };
    ["displayName", "emailAddress"]
        .iter()
        .filter_map(|key| assignee.get(key).and_then(Value::as_str))
        .find(|name| !name.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Lower-cased `status.statusCategory.key`, usually `new`, `indeterminate` or `done`.
pub fn status_category_of(issue: &RawIssue) -> String {
    issue
        .nested("status", "statusCategory")
        .and_then(|category| category.get("key"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase()
}

pub fn is_done(issue: &RawIssue) -> bool {
    status_category_of(issue) == DONE_CATEGORY
}

pub fn issue_type_of(issue: &RawIssue) -> String {
    issue
        .nested("issuetype", "name")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Never fails: absent, null or non-numeric values count as 0.
pub fn story_points_of(issue: &RawIssue, field_key: &str) -> f64 {
    let points = match issue.field(field_key) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    points.filter(|p| p.is_finite()).unwrap_or(0.0)
}

/// Days between `created` and `resolutiondate`, one decimal. Negative spans are kept.
pub fn cycle_time_days_of(issue: &RawIssue) -> f64 {
    let created = issue.field_str("created").and_then(parse_timestamp);
    let resolved = issue.field_str("resolutiondate").and_then(parse_timestamp);
    let (Some(created), Some(resolved)) = (created, resolved) else {
        return 0.0;
    };
    let millis = (resolved - created).num_milliseconds() as f64;
    round1(millis / MILLIS_PER_DAY)
}

/// Accepts RFC 3339 as well as the `+0000` offsets the tracker emits.
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
