use crate::analyze::{AssigneeStats, MetricsMap, SprintTotals, WorkloadDistribution};
use itertools::Itertools;

/// Sprint-wide figures ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SprintSummary {
    pub completed_issues: usize,
    pub total_issues: usize,
    pub completion_issues_pct: f64,
    pub completed_story_points: f64,
    pub total_story_points: f64,
    pub completion_story_points_pct: f64,
    pub velocity: f64,
    pub avg_cycle_time: f64,
    pub avg_story_points_per_task: f64,
    pub bug_to_story_ratio_pct: f64,
    pub distribution: Option<WorkloadDistribution>,
}

impl SprintSummary {
    pub fn from_totals(totals: &SprintTotals) -> Self {
        Self {
            completed_issues: totals.completed_issues,
            total_issues: totals.total_issues,
            completion_issues_pct: totals.completion_issues_pct(),
            completed_story_points: totals.completed_story_points,
            total_story_points: totals.total_story_points,
            completion_story_points_pct: totals.completion_story_points_pct(),
            velocity: totals.velocity(),
            avg_cycle_time: totals.avg_cycle_time(),
            avg_story_points_per_task: totals.avg_story_points_per_task(),
            bug_to_story_ratio_pct: totals.bug_to_story_ratio_pct(),
            distribution: totals.distribution(),
        }
    }
}

/// Per-assignee statistics ordered by name, ignoring case.
pub fn assignee_rows(metrics: &MetricsMap) -> Vec<AssigneeStats> {
    metrics
        .iter()
        .sorted_by_key(|(name, _)| name.to_lowercase())
        .map(|(name, m)| m.stats(name))
        .collect()
}

/// Every issue type seen across all assignees, sorted.
pub fn issue_types(metrics: &MetricsMap) -> Vec<String> {
    metrics
        .values()
        .flat_map(|m| m.issue_type_counts.keys())
        .unique()
        .sorted()
        .cloned()
        .collect()
}
