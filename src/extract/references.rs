//! Optional stage that pulls cross-references out of free-text fields.
//! It does not feed the metrics fold in any way.

use crate::model::RawIssue;
use indexmap::IndexSet;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static PULL_REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://[^\s<>|\]]*?(?:/pull/\d+|/-/merge_requests/\d+|/pull-requests/\d+)",
    )
    .expect("valid regex")
});
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>|\]\)]+").expect("valid regex"));
static ISSUE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][A-Z0-9]{1,9}-\d+\b").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKind {
    PullRequest,
    IssueKey,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub issue_key: String,
    pub kind: ReferenceKind,
    pub value: String,
    /// Field the reference was found in, e.g. `description` or `comment`.
    pub source: String,
}

pub fn scan_issues(issues: &[RawIssue]) -> Vec<Reference> {
    issues.iter().flat_map(scan_issue).collect()
}

pub fn scan_issue(issue: &RawIssue) -> Vec<Reference> {
    let own_key = issue.key();
    let mut seen = IndexSet::new();
    let mut references = vec![];

    for (source, text) in texts_of(issue) {
        let mut found = vec![];
        let pull_requests = PULL_REQUEST
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect::<Vec<_>>();
        for url in URL.find_iter(&text).map(|m| m.as_str()) {
            let url = url.trim_end_matches(['.', ',', ';']);
            match pull_requests.iter().find(|pr| url.starts_with(pr.as_str())) {
                Some(pr) => found.push((ReferenceKind::PullRequest, pr.clone())),
                None => found.push((ReferenceKind::Link, url.to_string())),
            }
        }
        let without_urls = URL.replace_all(&text, " ");
        for key in ISSUE_KEY.find_iter(&without_urls).map(|m| m.as_str()) {
            if key != own_key {
                found.push((ReferenceKind::IssueKey, key.to_string()));
            }
        }

        for (kind, value) in found {
            if seen.insert((kind, value.clone())) {
                references.push(Reference {
                    issue_key: own_key.to_string(),
                    kind,
                    value,
                    source: source.clone(),
                });
            }
        }
    }
    references
}

fn texts_of(issue: &RawIssue) -> Vec<(String, String)> {
    let mut texts = vec![];
    for name in ["summary", "description"] {
        if let Some(value) = issue.field(name) {
            texts.push((name.to_string(), flatten_text(value)));
        }
    }
    let comments = issue
        .nested("comment", "comments")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();
    for comment in comments {
        if let Some(body) = comment.get("body") {
            texts.push(("comment".to_string(), flatten_text(body)));
        }
    }
    for (key, value) in issue.fields() {
        if key.starts_with("customfield_") {
            if let Some(text) = value.as_str() {
                texts.push((key.clone(), text.to_string()));
            }
        }
    }
    texts
}

/// Plain strings pass through; rich-text documents contribute their `text` and `href` leaves.
fn flatten_text(value: &Value) -> String {
    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(text) => out.push(text.clone()),
            Value::Array(items) => items.iter().for_each(|item| walk(item, out)),
            Value::Object(map) => {
                for (key, item) in map {
                    match (key.as_str(), item) {
                        ("text" | "href" | "url", Value::String(text)) => out.push(text.clone()),
                        (_, Value::Array(_) | Value::Object(_)) => walk(item, out),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    let mut out = vec![];
    walk(value, &mut out);
    out.join(" ")
}
