use indexmap::IndexMap;

/// Assignee name → statistics, in the order assignees were first seen.
pub type MetricsMap = IndexMap<String, AssigneeMetrics>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssigneeMetrics {
    pub total_issues: usize,
    pub completed_issues: usize,
    pub total_story_points: f64,
    pub completed_story_points: f64,
    pub issue_type_counts: IndexMap<String, usize>,
    pub bug_count: usize,
    pub story_count: usize,
    /// Days, one sample per completed issue with a positive cycle time.
    pub cycle_times: Vec<f64>,
    /// One sample per issue, zeros included.
    pub story_points: Vec<f64>,
}

/// The facts one issue contributes to its assignee's bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueFacts {
    pub assignee: String,
    pub issue_type: String,
    pub story_points: f64,
    pub done: bool,
    pub cycle_time: f64,
}

/// Sprint-wide sums over every bucket except `Unassigned`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SprintTotals {
    pub total_issues: usize,
    pub completed_issues: usize,
    pub total_story_points: f64,
    pub completed_story_points: f64,
    pub total_bugs: usize,
    pub total_stories: usize,
    pub cycle_times: Vec<f64>,
    pub story_points: Vec<f64>,
    /// Each assignee's total, only for assignees with more than zero points.
    pub assignee_story_points: Vec<f64>,
}

/// Derived per-assignee figures, computed at report time.
#[derive(Debug, Clone, PartialEq)]
pub struct AssigneeStats {
    pub assignee: String,
    pub total_issues: usize,
    pub completed_issues: usize,
    pub completion_issues_pct: f64,
    pub total_story_points: f64,
    pub completed_story_points: f64,
    pub completion_story_points_pct: f64,
    pub avg_story_points_per_issue: f64,
    pub avg_cycle_time: f64,
    pub bug_ratio_pct: f64,
    pub workload_score: f64,
    pub issue_type_counts: IndexMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadDistribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}
