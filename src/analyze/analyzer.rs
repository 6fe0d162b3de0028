use crate::analyze::{
    AssigneeMetrics, AssigneeStats, IssueFacts, MetricsMap, SprintTotals, WorkloadDistribution,
};
use crate::extract::fields::round1;
use crate::extract::{
    assignee_of, cycle_time_days_of, is_done, issue_type_of, story_points_of, UNASSIGNED,
};
use crate::model::RawIssue;
use tracing::warn;

/// Folds the issues into one bucket per assignee in a single pass.
pub fn aggregate(issues: &[RawIssue], story_points_field: &str) -> MetricsMap {
    issues
        .iter()
        .map(|issue| IssueFacts::of(issue, story_points_field))
        .fold(MetricsMap::new(), |mut metrics, facts| {
            metrics
                .entry(facts.assignee.clone())
                .or_default()
                .record(&facts);
            metrics
        })
}

pub fn roll_up(metrics: &MetricsMap) -> SprintTotals {
    metrics
        .iter()
        .filter(|(assignee, _)| assignee.as_str() != UNASSIGNED)
        .fold(SprintTotals::default(), |mut acc, (_, m)| {
            acc.total_issues += m.total_issues;
            acc.completed_issues += m.completed_issues;
            acc.total_story_points += m.total_story_points;
            acc.completed_story_points += m.completed_story_points;
            acc.total_bugs += m.bug_count;
            acc.total_stories += m.story_count;
            acc.cycle_times.extend(&m.cycle_times);
            acc.story_points.extend(&m.story_points);
            if m.total_story_points > 0.0 {
                acc.assignee_story_points.push(m.total_story_points);
            }
            acc
        })
}

impl IssueFacts {
    pub fn of(issue: &RawIssue, story_points_field: &str) -> Self {
        let cycle_time = cycle_time_days_of(issue);
        if cycle_time < 0.0 {
            warn!(issue = issue.key(), cycle_time, "resolved before it was created");
        }
        Self {
            assignee: assignee_of(issue),
            issue_type: issue_type_of(issue),
            story_points: story_points_of(issue, story_points_field),
            done: is_done(issue),
            cycle_time,
        }
    }
}

impl AssigneeMetrics {
    pub fn record(&mut self, facts: &IssueFacts) {
        self.total_issues += 1;
        self.total_story_points += facts.story_points;
        self.story_points.push(facts.story_points);
        *self
            .issue_type_counts
            .entry(facts.issue_type.clone())
            .or_insert(0) += 1;

        match facts.issue_type.to_lowercase().as_str() {
            "bug" => self.bug_count += 1,
            "story" => self.story_count += 1,
            _ => {}
        }

        if facts.done {
            self.completed_issues += 1;
            self.completed_story_points += facts.story_points;
            if facts.cycle_time > 0.0 {
                self.cycle_times.push(facts.cycle_time);
            }
        }
    }

    pub fn stats(&self, assignee: &str) -> AssigneeStats {
        let issues = self.total_issues as f64;
        AssigneeStats {
            assignee: assignee.to_string(),
            total_issues: self.total_issues,
            completed_issues: self.completed_issues,
            completion_issues_pct: percent(self.completed_issues as f64, issues),
            total_story_points: self.total_story_points,
            completed_story_points: self.completed_story_points,
            completion_story_points_pct: percent(
                self.completed_story_points,
                self.total_story_points,
            ),
            avg_story_points_per_issue: ratio(self.total_story_points, issues),
            avg_cycle_time: mean(&self.cycle_times).map(round1).unwrap_or(0.0),
            bug_ratio_pct: percent(self.bug_count as f64, issues),
            workload_score: round1(self.total_story_points / issues.max(1.0)),
            issue_type_counts: self.issue_type_counts.clone(),
        }
    }
}

impl SprintTotals {
    pub fn completion_issues_pct(&self) -> f64 {
        percent(self.completed_issues as f64, self.total_issues as f64)
    }

    pub fn completion_story_points_pct(&self) -> f64 {
        percent(self.completed_story_points, self.total_story_points)
    }

    pub fn velocity(&self) -> f64 {
        self.completed_story_points
    }

    pub fn avg_cycle_time(&self) -> f64 {
        mean(&self.cycle_times).map(round1).unwrap_or(0.0)
    }

    pub fn avg_story_points_per_task(&self) -> f64 {
        mean(&self.story_points).map(round1).unwrap_or(0.0)
    }

    pub fn bug_to_story_ratio_pct(&self) -> f64 {
        round1(self.total_bugs as f64 / self.total_stories.max(1) as f64 * 100.0)
    }

    /// `None` when no assignee carries story points.
    pub fn distribution(&self) -> Option<WorkloadDistribution> {
        let samples = &self.assignee_story_points;
        let mean = mean(samples)?;
        let variance =
            samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        Some(WorkloadDistribution {
            min: round1(samples.iter().copied().fold(f64::INFINITY, f64::min)),
            max: round1(samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            mean: round1(mean),
            std_dev: round1(variance.sqrt()),
        })
    }
}

fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round1(part / whole)
    } else {
        0.0
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round1(100.0 * part / whole)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const SP: &str = "customfield_10016";

    fn issue(assignee: Value, issue_type: &str, points: Value, category: &str) -> RawIssue {
        RawIssue::new(json!({
            "key": "KPI-1",
            "fields": {
                "assignee": assignee,
                "issuetype": { "name": issue_type },
                "status": { "statusCategory": { "key": category } },
                SP: points,
            }
        }))
    }

    fn alice() -> Value {
        json!({ "displayName": "Alice" })
    }

    #[test]
    fn completed_story_with_cycle_time() {
        let done = RawIssue::new(json!({
            "key": "KPI-7",
            "fields": {
                "assignee": alice(),
                "issuetype": { "name": "Story" },
                "status": { "statusCategory": { "key": "done" } },
                "created": "2024-01-01T00:00:00Z",
                "resolutiondate": "2024-01-04T00:00:00Z",
                SP: 5,
            }
        }));
        let metrics = aggregate(&[done], SP);
        let alice = &metrics["Alice"];
        assert_eq!(alice.total_issues, 1);
        assert_eq!(alice.completed_issues, 1);
        assert_eq!(alice.total_story_points, 5.0);
        assert_eq!(alice.completed_story_points, 5.0);
        assert_eq!(alice.cycle_times, vec![3.0]);
        assert_eq!(alice.story_count, 1);
    }

    #[test]
    fn average_and_completion_for_mixed_bucket() {
        let issues = vec![
            issue(alice(), "Task", json!(3), "done"),
            issue(alice(), "Task", json!(2), "indeterminate"),
        ];
        let metrics = aggregate(&issues, SP);
        let stats = metrics["Alice"].stats("Alice");
        assert_eq!(stats.avg_story_points_per_issue, 2.5);
        assert_eq!(stats.completion_issues_pct, 50.0);
        assert_eq!(stats.completion_story_points_pct, 60.0);
        assert_eq!(stats.avg_cycle_time, 0.0);
        assert_eq!(stats.workload_score, 2.5);
    }

    #[test]
    fn missing_points_still_count_as_issues() {
        let issues = vec![issue(alice(), "Bug", Value::Null, "done")];
        let alice = &aggregate(&issues, SP)["Alice"];
        assert_eq!(alice.total_issues, 1);
        assert_eq!(alice.total_story_points, 0.0);
        assert_eq!(alice.story_points, vec![0.0]);
        assert_eq!(alice.bug_count, 1);
        assert!(alice.cycle_times.is_empty());
    }

    #[test]
    fn type_matching_is_case_insensitive() {
        let issues = vec![
            issue(alice(), "BUG", json!(1), "new"),
            issue(alice(), "story", json!(1), "new"),
            issue(alice(), "Epic", json!(1), "new"),
        ];
        let alice = &aggregate(&issues, SP)["Alice"];
        assert_eq!(alice.bug_count, 1);
        assert_eq!(alice.story_count, 1);
        assert_eq!(alice.issue_type_counts.get("Epic"), Some(&1));
        assert_eq!(alice.issue_type_counts.len(), 3);
    }

    #[test]
    fn unassigned_is_excluded_from_totals_but_unknown_is_not() {
        let issues = vec![
            issue(alice(), "Story", json!(5), "done"),
            issue(Value::Null, "Story", json!(8), "done"),
            issue(json!({}), "Bug", json!(2), "new"),
        ];
        let metrics = aggregate(&issues, SP);
        assert_eq!(metrics.len(), 3);
        let totals = roll_up(&metrics);
        assert_eq!(totals.total_issues, 2);
        assert_eq!(totals.completed_issues, 1);
        assert_eq!(totals.total_story_points, 7.0);
        assert_eq!(totals.completed_story_points, 5.0);
        assert_eq!(totals.total_bugs, 1);
        assert_eq!(totals.total_stories, 1);
        assert_eq!(totals.story_points, vec![5.0, 2.0]);
        assert_eq!(totals.assignee_story_points, vec![5.0, 2.0]);
    }

    #[test]
    fn removing_an_issue_decreases_its_totals() {
        let mut issues = vec![
            issue(alice(), "Story", json!(5), "done"),
            issue(json!({ "displayName": "Bob" }), "Bug", json!(3), "done"),
        ];
        let before = roll_up(&aggregate(&issues, SP));
        issues.pop();
        let after = roll_up(&aggregate(&issues, SP));
        assert_eq!(before.total_issues - after.total_issues, 1);
        assert_eq!(before.total_story_points - after.total_story_points, 3.0);
        assert_eq!(before.completed_story_points - after.completed_story_points, 3.0);
        assert_eq!(before.total_bugs - after.total_bugs, 1);
        assert_eq!(before.total_stories, after.total_stories);
    }

    #[test]
    fn zero_point_assignees_are_left_out_of_distribution() {
        let issues = vec![
            issue(alice(), "Story", json!(2), "done"),
            issue(json!({ "displayName": "Bob" }), "Story", json!(6), "done"),
            issue(json!({ "displayName": "Cy" }), "Story", json!(0), "done"),
        ];
        let totals = roll_up(&aggregate(&issues, SP));
        let distribution = totals.distribution().unwrap();
        assert_eq!(distribution.min, 2.0);
        assert_eq!(distribution.max, 6.0);
        assert_eq!(distribution.mean, 4.0);
        assert_eq!(distribution.std_dev, 2.0);
    }

    #[test]
    fn empty_sprint_has_zero_totals() {
        let metrics = aggregate(&[], SP);
        assert!(metrics.is_empty());
        let totals = roll_up(&metrics);
        assert_eq!(totals, SprintTotals::default());
        assert_eq!(totals.distribution(), None);
        assert_eq!(totals.completion_issues_pct(), 0.0);
        assert_eq!(totals.bug_to_story_ratio_pct(), 0.0);
    }

    #[test]
    fn invariants_hold_per_bucket() {
        let issues = vec![
            issue(alice(), "Story", json!(5), "done"),
            issue(alice(), "Story", json!("x"), "new"),
            issue(Value::Null, "Task", json!(1), "done"),
        ];
        for (_, m) in aggregate(&issues, SP) {
            assert!(m.completed_issues <= m.total_issues);
            assert!(m.completed_story_points <= m.total_story_points);
            assert_eq!(m.story_points.len(), m.total_issues);
        }
    }
}
