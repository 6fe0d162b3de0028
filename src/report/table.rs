use crate::analyze::AssigneeStats;
use crate::model::Result;
use crate::report::SprintSummary;
use std::borrow::Cow;
use std::fs;

pub const FIXED_COLUMNS: [&str; 11] = [
    "Assignee",
    "Total Issues",
    "Completed Issues",
    "Completion % (Issues)",
    "Total Story Points",
    "Completed Story Points",
    "Completion % (Story Points)",
    "Avg Story Points per Issue",
    "Avg Cycle Time (Days)",
    "Bug Ratio (%)",
    "Workload Score",
];

/// The export: header, assignee rows, a blank row, then the summary block.
/// Every row has exactly as many cells as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn build(
        assignees: &[AssigneeStats],
        issue_types: &[String],
        summary: &SprintSummary,
    ) -> Self {
        let header = FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(issue_types.iter().map(|t| format!("Issues: {t}")))
            .collect::<Vec<_>>();
        let width = header.len();

        let mut rows = vec![header];
        for stats in assignees {
            let mut row = vec![
                stats.assignee.clone(),
                stats.total_issues.to_string(),
                stats.completed_issues.to_string(),
                decimal(stats.completion_issues_pct),
                decimal(stats.total_story_points),
                decimal(stats.completed_story_points),
                decimal(stats.completion_story_points_pct),
                decimal(stats.avg_story_points_per_issue),
                decimal(stats.avg_cycle_time),
                decimal(stats.bug_ratio_pct),
                decimal(stats.workload_score),
            ];
            row.extend(issue_types.iter().map(|t| {
                stats
                    .issue_type_counts
                    .get(t)
                    .copied()
                    .unwrap_or(0)
                    .to_string()
            }));
            rows.push(row);
        }
        rows.push(vec![]);
        rows.extend(summary_rows(summary));

        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows }
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.header().len()
    }

    /// Comma-separated, quoted where needed, rows joined by `\n`.
    pub fn to_csv(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| escape_cell(cell)).collect::<Vec<_>>().join(","))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write_csv(&self, path: &str) -> Result<()> {
        fs::write(path, self.to_csv())?;
        Ok(())
    }
}

fn summary_rows(summary: &SprintSummary) -> Vec<Vec<String>> {
    let labelled = |label: &str, value: String| vec![label.to_string(), value];
    let mut rows = vec![
        vec!["=== SPRINT SUMMARY ===".to_string()],
        labelled(
            "Total Tasks Completed",
            format!(
                "{}/{} ({}%)",
                summary.completed_issues,
                summary.total_issues,
                decimal(summary.completion_issues_pct)
            ),
        ),
        labelled(
            "Total Story Points Completed",
            format!(
                "{}/{} ({}%)",
                decimal(summary.completed_story_points),
                decimal(summary.total_story_points),
                decimal(summary.completion_story_points_pct)
            ),
        ),
        labelled("Team Velocity (Completed SP)", decimal(summary.velocity)),
        labelled(
            "Average Cycle Time",
            format!("{} days", decimal(summary.avg_cycle_time)),
        ),
        labelled(
            "Average Story Points per Task",
            decimal(summary.avg_story_points_per_task),
        ),
        labelled(
            "Bug-to-Story Ratio",
            format!("{}%", decimal(summary.bug_to_story_ratio_pct)),
        ),
    ];
    if let Some(distribution) = &summary.distribution {
        rows.extend([
            vec![],
            vec!["=== WORKLOAD DISTRIBUTION ===".to_string()],
            labelled("Min Story Points (Assignee)", decimal(distribution.min)),
            labelled("Max Story Points (Assignee)", decimal(distribution.max)),
            labelled("Avg Story Points (Assignee)", decimal(distribution.mean)),
            labelled("Workload Std Deviation", decimal(distribution.std_dev)),
        ]);
    }
    rows
}

/// Whole numbers keep one decimal (`5.0`); anything else prints as-is.
pub fn decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

pub fn escape_cell(cell: &str) -> Cow<'_, str> {
    if cell.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{aggregate, roll_up};
    use crate::model::RawIssue;
    use crate::report::{assignee_rows, issue_types};
    use serde_json::json;

    const SP: &str = "customfield_10016";

    fn table_for(issues: &[RawIssue]) -> ReportTable {
        let metrics = aggregate(issues, SP);
        let summary = SprintSummary::from_totals(&roll_up(&metrics));
        ReportTable::build(&assignee_rows(&metrics), &issue_types(&metrics), &summary)
    }

    fn issue(name: &str, issue_type: &str, points: f64, category: &str) -> RawIssue {
        RawIssue::new(json!({
            "key": "KPI-1",
            "fields": {
                "assignee": { "displayName": name },
                "issuetype": { "name": issue_type },
                "status": { "statusCategory": { "key": category } },
                SP: points,
            }
        }))
    }

    /// Minimal reader for the export format: quoted cells, doubled quotes, `\n` rows.
    fn parse_csv(text: &str) -> Vec<Vec<String>> {
        let mut rows = vec![];
        let mut row = vec![];
        let mut cell = String::new();
        let mut quoted = false;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match (quoted, c) {
                (true, '"') if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                (true, '"') => quoted = false,
                (true, c) => cell.push(c),
                (false, '"') => quoted = true,
                (false, ',') => row.push(std::mem::take(&mut cell)),
                (false, '\n') => {
                    row.push(std::mem::take(&mut cell));
                    rows.push(std::mem::take(&mut row));
                }
                (false, c) => cell.push(c),
            }
        }
        row.push(cell);
        rows.push(row);
        rows
    }

    #[test]
    fn empty_sprint_emits_header_blank_and_summary() {
        let table = table_for(&[]);
        let rows = table.rows();
        assert_eq!(table.width(), FIXED_COLUMNS.len());
        assert_eq!(rows[0], FIXED_COLUMNS.map(String::from).to_vec());
        assert!(rows[1].iter().all(String::is_empty));
        assert_eq!(rows[2][0], "=== SPRINT SUMMARY ===");
        assert_eq!(rows[3][1], "0/0 (0.0%)");
        assert_eq!(rows[4][1], "0.0/0.0 (0.0%)");
        assert_eq!(rows[5][1], "0.0");
        assert_eq!(rows[6][1], "0.0 days");
        assert_eq!(rows[8][1], "0.0%");
        assert_eq!(rows.len(), 9);
        assert!(!rows.iter().any(|r| r[0] == "=== WORKLOAD DISTRIBUTION ==="));
    }

    #[test]
    fn assignee_rows_carry_type_columns() {
        let table = table_for(&[
            issue("bob", "Bug", 2.0, "new"),
            issue("Alice", "Story", 3.0, "done"),
            issue("Alice", "Story", 2.0, "new"),
        ]);
        let rows = table.rows();
        assert_eq!(rows[0][11..], ["Issues: Bug", "Issues: Story"]);
        assert_eq!(
            rows[1],
            vec![
                "Alice", "2", "1", "50.0", "5.0", "3.0", "60.0", "2.5", "0.0", "0.0", "2.5", "0",
                "2"
            ]
        );
        assert_eq!(rows[2][0], "bob");
        assert_eq!(rows[2][9], "100.0");
        assert!(rows[3].iter().all(String::is_empty));
        assert!(rows.iter().all(|r| r.len() == table.width()));

        let distribution = rows
            .iter()
            .position(|r| r[0] == "=== WORKLOAD DISTRIBUTION ===")
            .unwrap();
        assert_eq!(rows[distribution + 1][1], "2.0");
        assert_eq!(rows[distribution + 2][1], "5.0");
        assert_eq!(rows[distribution + 3][1], "3.5");
        assert_eq!(rows[distribution + 4][1], "1.5");
    }

    #[test]
    fn cells_with_separators_are_quoted() {
        assert_eq!(escape_cell("plain"), "plain");
        assert_eq!(escape_cell("Doe, Jane"), "\"Doe, Jane\"");
        assert_eq!(escape_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_cell("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn csv_reads_back_to_the_same_cells() {
        let table = table_for(&[
            issue("Doe, Jane", "Story", 1.5, "done"),
            issue("\"Quoted\" Q", "Sub-task, ops", 0.0, "new"),
            issue("Line\nBreak", "Bug", 4.0, "done"),
        ]);
        assert_eq!(parse_csv(&table.to_csv()), table.rows().to_vec());
    }

    #[test]
    fn decimals_keep_one_place_for_whole_numbers() {
        assert_eq!(decimal(5.0), "5.0");
        assert_eq!(decimal(2.5), "2.5");
        assert_eq!(decimal(0.0), "0.0");
        assert_eq!(decimal(-3.0), "-3.0");
    }
}
