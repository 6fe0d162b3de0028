use crate::utils::ProgressStyleTemplate;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use sprint_kpi::jira::FetchProgress;
use std::time::Duration;

pub trait MultiProgressNew {
    fn add_with_style(&self, pb: ProgressBar, style: ProgressStyle) -> ProgressBar;
}

impl MultiProgressNew for MultiProgress {
    fn add_with_style(&self, pb: ProgressBar, style: ProgressStyle) -> ProgressBar {
        let pb = self.add(pb);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Mirrors fetch events on a progress bar.
pub fn fetch_progress(pb: ProgressBar) -> impl Fn(FetchProgress) + Send + Sync + 'static {
    move |event| match event {
        FetchProgress::PathStarted { path } => {
            pb.reset();
            pb.set_style(ProgressStyleTemplate::only_message());
            pb.set_message(format!("Fetching issues via `{path}` ..."));
        }
        FetchProgress::PageFetched {
            path,
            fetched,
            total,
        } => {
            pb.set_style(ProgressStyleTemplate::issues_bar());
            pb.set_message(format!("via `{path}`"));
            pb.set_length(total);
            pb.set_position(fetched as u64);
        }
    }
}
