use crate::analyze::{aggregate, roll_up, AssigneeStats, MetricsMap, SprintTotals};
use crate::extract::references::{self, Reference};
use crate::extract::story_points::{self, DetectionReason, FieldDetection};
use crate::jira::{FetchProgress, HttpGet, SprintFetcher};
use crate::model::{Configuration, RawIssue, Result};
use crate::report::{assignee_rows, issue_types, markdown, ReportTable, SprintSummary};
use tracing::{info, warn};

/// Everything one report generation produces.
#[derive(Debug, Clone)]
pub struct SprintReport {
    pub sprint_id: u64,
    pub story_points_field: FieldDetection,
    pub issue_count: usize,
    pub metrics: MetricsMap,
    pub totals: SprintTotals,
    pub assignees: Vec<AssigneeStats>,
    pub summary: SprintSummary,
    pub table: ReportTable,
    /// `None` unless reference scanning was enabled.
    pub references: Option<Vec<Reference>>,
}

impl SprintReport {
    /// Builds the report from issues that were already fetched.
    pub fn from_issues(
        sprint_id: u64,
        issues: &[RawIssue],
        story_points_field: FieldDetection,
        scan_references: bool,
    ) -> Self {
        let metrics = aggregate(issues, &story_points_field.key);
        let totals = roll_up(&metrics);
        let assignees = assignee_rows(&metrics);
        let summary = SprintSummary::from_totals(&totals);
        let table = ReportTable::build(&assignees, &issue_types(&metrics), &summary);
        let references = scan_references.then(|| references::scan_issues(issues));
        Self {
            sprint_id,
            story_points_field,
            issue_count: issues.len(),
            metrics,
            totals,
            assignees,
            summary,
            table,
            references,
        }
    }

    pub fn markdown(&self) -> Result<String> {
        markdown::render(self.sprint_id, &self.assignees, &self.summary)
    }

    pub fn default_file_name(&self) -> String {
        format!("sprint_{}_kpi.csv", self.sprint_id)
    }
}

/// Network half of a report: the sprint's issues and the story-points field to read.
#[derive(Debug, Clone)]
pub struct FetchedSprint {
    pub sprint_id: u64,
    pub issues: Vec<RawIssue>,
    pub story_points_field: FieldDetection,
}

impl FetchedSprint {
    pub fn into_report(self, scan_references: bool) -> SprintReport {
        SprintReport::from_issues(
            self.sprint_id,
            &self.issues,
            self.story_points_field,
            scan_references,
        )
    }
}

/// Resolves the sprint, fetches its issues and settles the story-points field.
pub async fn fetch_sprint<C: HttpGet>(
    config: &Configuration,
    client: &C,
    progress: impl Fn(FetchProgress) + Send + Sync + 'static,
) -> Result<FetchedSprint> {
    let fetcher = SprintFetcher::new(client, config).with_progress(progress);
    let sprint_id = fetcher.resolve_sprint_id().await?;
    let issues = fetcher.fetch_issues(sprint_id).await?;

    let field = match config.story_points_field() {
        Some(key) => FieldDetection {
            key: key.to_string(),
            name: None,
            reason: DetectionReason::Configured,
        },
        None => {
            let metadata = match fetcher.fetch_field_metadata().await {
                Ok(payload) => story_points::parse_metadata(&payload),
                Err(error) => {
                    warn!(%error, "field metadata unavailable, guessing from issue values");
                    Vec::new()
                }
            };
            let detection = story_points::detect_field(&metadata, &issues);
            if detection.reason == DetectionReason::Default {
                warn!(
                    field = %detection.key,
                    "could not detect the story points field, using the default"
                );
            }
            detection
        }
    };
    info!(field = %field.key, reason = ?field.reason, "story points field");

    Ok(FetchedSprint {
        sprint_id,
        issues,
        story_points_field: field,
    })
}

/// Resolves the sprint, fetches its issues and computes the report.
pub async fn generate<C: HttpGet>(
    config: &Configuration,
    client: &C,
    progress: impl Fn(FetchProgress) + Send + Sync + 'static,
) -> Result<SprintReport> {
    let fetched = fetch_sprint(config, client, progress).await?;
    Ok(fetched.into_report(config.scan_references))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn references_only_when_enabled() {
        let issues = vec![RawIssue::new(json!({
            "key": "KPI-1",
            "fields": { "summary": "See OPS-1" }
        }))];
        let field = FieldDetection {
            key: "customfield_10016".into(),
            name: None,
            reason: DetectionReason::Configured,
        };
        let off = SprintReport::from_issues(3, &issues, field.clone(), false);
        assert_eq!(off.references, None);
        assert_eq!(off.issue_count, 1);
        assert_eq!(off.default_file_name(), "sprint_3_kpi.csv");

        let fetched = FetchedSprint {
            sprint_id: 3,
            issues,
            story_points_field: field,
        };
        let on = fetched.into_report(true);
        assert_eq!(on.references.map(|r| r.len()), Some(1));
        assert_eq!(on.metrics["Unassigned"].total_issues, 1);
        assert_eq!(on.totals.total_issues, 0);
    }
}
