use crate::analyze::AssigneeStats;
use crate::model::{Error, Result};
use crate::report::table::decimal;
use crate::report::SprintSummary;
use markdown_builder::Markdown;
use markdown_table::{Heading, HeadingAlignment, MarkdownTable};

/// On-screen rendering of one sprint's metrics.
pub fn render(
    sprint_id: u64,
    assignees: &[AssigneeStats],
    summary: &SprintSummary,
) -> Result<String> {
    let mut doc = Markdown::new();
    doc.header1(format!("Sprint {sprint_id}"));
    doc.add_assignees(assignees)?;
    doc.add_summary(summary)?;
    Ok(doc.render())
}

trait MarkdownExt {
    fn add_assignees(&mut self, assignees: &[AssigneeStats]) -> Result<()>;
    fn add_summary(&mut self, summary: &SprintSummary) -> Result<()>;
}

impl MarkdownExt for Markdown {
    fn add_assignees(&mut self, assignees: &[AssigneeStats]) -> Result<()> {
        self.header2("Assignees");
        if assignees.is_empty() {
            self.paragraph("*No issues in this sprint.*");
            return Ok(());
        }

        let header = [
            ("Assignee", None),
            ("Issues", Some(HeadingAlignment::Center)),
            ("Story points", Some(HeadingAlignment::Center)),
            ("Avg SP / issue", Some(HeadingAlignment::Center)),
            ("Avg cycle (days)", Some(HeadingAlignment::Center)),
            ("Bugs", Some(HeadingAlignment::Center)),
            ("Workload", Some(HeadingAlignment::Center)),
        ]
        .into_iter()
        .map(|(title, alignment)| Heading::new(title.to_string(), alignment))
        .collect::<Vec<_>>();

        let table = assignees
            .iter()
            .map(|s| {
                vec![
                    format!("**{}**", s.assignee),
                    format!(
                        "{}/{} ({}%)",
                        s.completed_issues,
                        s.total_issues,
                        decimal(s.completion_issues_pct)
                    ),
                    format!(
                        "{}/{} ({}%)",
                        decimal(s.completed_story_points),
                        decimal(s.total_story_points),
                        decimal(s.completion_story_points_pct)
                    ),
                    decimal(s.avg_story_points_per_issue),
                    decimal(s.avg_cycle_time),
                    format!("{}%", decimal(s.bug_ratio_pct)),
                    decimal(s.workload_score),
                ]
            })
            .collect::<Vec<_>>();

        let mut md_table = MarkdownTable::new(table);
        md_table.with_headings(header);
        let rendered = md_table
            .as_markdown()
            .map_err(|e| Error::Render(format!("{e:?}")))?;
        self.paragraph(rendered);
        Ok(())
    }

    fn add_summary(&mut self, summary: &SprintSummary) -> Result<()> {
        self.header2("Sprint summary");

        let mut table = vec![
            vec![
                "Tasks completed".to_string(),
                format!(
                    "{}/{} ({}%)",
                    summary.completed_issues,
                    summary.total_issues,
                    decimal(summary.completion_issues_pct)
                ),
            ],
            vec![
                "Story points completed".to_string(),
                format!(
                    "{}/{} ({}%)",
                    decimal(summary.completed_story_points),
                    decimal(summary.total_story_points),
                    decimal(summary.completion_story_points_pct)
                ),
            ],
            vec!["Team velocity".to_string(), format!("{} points", decimal(summary.velocity))],
            vec![
                "Average cycle time".to_string(),
                format!("{} days", decimal(summary.avg_cycle_time)),
            ],
            vec![
                "Average story points per task".to_string(),
                decimal(summary.avg_story_points_per_task),
            ],
            vec![
                "Bug-to-story ratio".to_string(),
                format!("{}%", decimal(summary.bug_to_story_ratio_pct)),
            ],
        ];
        if let Some(d) = &summary.distribution {
            table.push(vec![
                "Workload (min / max / mean / std dev)".to_string(),
                format!(
                    "{} / {} / {} / {}",
                    decimal(d.min),
                    decimal(d.max),
                    decimal(d.mean),
                    decimal(d.std_dev)
                ),
            ]);
        }

        let header = vec![
            Heading::new("".to_string(), None),
            Heading::new("".to_string(), Some(HeadingAlignment::Center)),
        ];
        let mut md_table = MarkdownTable::new(table);
        md_table.with_headings(header);
        let rendered = md_table
            .as_markdown()
            .map_err(|e| Error::Render(format!("{e:?}")))?;
        self.paragraph(rendered);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{SprintTotals, WorkloadDistribution};

    fn summary() -> SprintSummary {
        SprintSummary::from_totals(&SprintTotals::default())
    }

    #[test]
    fn empty_sprint_renders_placeholder() {
        let rendered = render(42, &[], &summary()).unwrap();
        assert!(rendered.contains("Sprint 42"));
        assert!(rendered.contains("No issues in this sprint"));
        assert!(rendered.contains("0/0 (0.0%)"));
        assert!(!rendered.contains("Workload (min"));
    }

    #[test]
    fn distribution_is_rendered_when_present() {
        let mut summary = summary();
        summary.distribution = Some(WorkloadDistribution {
            min: 2.0,
            max: 5.0,
            mean: 3.5,
            std_dev: 1.5,
        });
        let rendered = render(1, &[], &summary).unwrap();
        assert!(rendered.contains("2.0 / 5.0 / 3.5 / 1.5"));
    }
}
