mod utils;

use crate::utils::{fetch_progress, MultiProgressNew, ProgressStyleTemplate};
use anyhow::Context;
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar};
use itertools::Itertools;
use sprint_kpi::jira::ReqwestClient;
use sprint_kpi::{Configuration, SprintReport, TransportPath};
use std::fs;
use std::process::ExitCode;
use tracing::error;

/// Per-assignee sprint metrics (team health / workload view).
#[derive(Parser, Debug, Clone)]
struct Args {
    #[arg(long = "base-url", env = "JIRA_BASE_URL")]
    base_url: String,
    #[arg(long = "email", env = "JIRA_EMAIL")]
    email: String,
    #[arg(long = "api-token", env = "JIRA_API_TOKEN", hide_env_values = true)]
    api_token: String,
    /// Custom field holding story points; empty to detect it
    #[arg(long = "story-points-field", env = "JIRA_STORY_POINTS_FIELD", default_value = "")]
    story_points_field: String,
    /// Sprint id (from the sprint report URL, e.g. sprint=345)
    #[arg(long = "sprint-id")]
    sprint_id: Option<u64>,
    /// Board URL or id; its active sprint is used when no sprint id is given
    #[arg(long = "board")]
    board: Option<String>,
    /// JSON file listing the transport paths to try, in order
    #[arg(long = "transports")]
    transports_path: Option<String>,
    /// First-party relay tried after the direct path
    #[arg(long = "relay-url")]
    relay_url: Option<String>,
    /// CSV destination (default: sprint_<id>_kpi.csv)
    #[arg(long = "output")]
    output: Option<String>,
    /// Also write the markdown summary to this file
    #[arg(long = "summary")]
    summary: Option<String>,
    /// List cross-references found in issue text
    #[arg(long = "scan-references")]
    scan_references: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let config = build_config(args)?;

    let multi_progress = MultiProgress::default();
    let fetch_pb = multi_progress.add_with_style(
        ProgressBar::no_length(),
        ProgressStyleTemplate::only_message(),
    );
    fetch_pb.set_message("Resolving sprint ...");
    let compute_pb = multi_progress.add_with_style(
        ProgressBar::new_spinner(),
        ProgressStyleTemplate::only_message(),
    );
    compute_pb.set_message("Waiting issues");

    let client = ReqwestClient::default();
    let fetched = sprint_kpi::fetch_sprint(&config, &client, fetch_progress(fetch_pb.clone())).await;
    let fetched = match fetched {
        Ok(fetched) => fetched,
        Err(e) => {
            fetch_pb.abandon_with_message("❌ Fetch failed");
            compute_pb.abandon_with_message("❌ Nothing to compute");
            return Err(e).context("Could not generate the sprint report");
        }
    };
    fetch_pb.set_style(ProgressStyleTemplate::only_message());
    fetch_pb.finish_with_message(format!(
        "✅ Completed fetch of sprint {} (find {} issues)",
        fetched.sprint_id,
        fetched.issues.len()
    ));

    compute_pb.set_message(format!(
        "Computing metrics (field `{}`) ...",
        fetched.story_points_field.key
    ));
    let report = fetched.into_report(config.scan_references);
    compute_pb.finish_with_message(format!(
        "✅ Computed metrics for {} assignees",
        report.metrics.len()
    ));

    write_outputs(args, &report)?;
    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<Configuration> {
    let mut transports = match &args.transports_path {
        Some(path) => TransportPath::from_config(path)
            .with_context(|| format!("Could not read transports file `{path}`"))?,
        None => vec![TransportPath::direct()],
    };
    if let Some(relay_url) = &args.relay_url {
        let relay = TransportPath::relay(relay_url);
        let position = transports.len().min(1);
        transports.insert(position, relay);
    }

    let mut config = Configuration::new(&args.base_url, &args.email, &args.api_token)
        .with_story_points_field(&args.story_points_field)
        .with_transports(transports)
        .with_reference_scan(args.scan_references);
    if let Some(sprint_id) = args.sprint_id {
        config = config.with_sprint_id(sprint_id);
    }
    if let Some(board) = &args.board {
        config = config.with_board_reference(board);
    }
    Ok(config.validate()?)
}

fn write_outputs(args: &Args, report: &SprintReport) -> anyhow::Result<()> {
    let markdown = report.markdown()?;
    println!("{markdown}");
    println!(
        "Story points field: {} ({:?})",
        report.story_points_field.key, report.story_points_field.reason
    );

    if let Some(references) = &report.references {
        println!("\nCross-references ({}):", references.len());
        for (issue_key, group) in &references.iter().chunk_by(|r| r.issue_key.clone()) {
            let values = group.map(|r| format!("{:?} {}", r.kind, r.value)).join(", ");
            println!("  {issue_key}: {values}");
        }
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| report.default_file_name());
    report
        .table
        .write_csv(&output)
        .with_context(|| format!("Could not write `{output}`"))?;
    println!("\nWrote metrics to {output}. Open it in Excel/Sheets for detailed analysis.");

    if let Some(path) = &args.summary {
        fs::write(path, &markdown).with_context(|| format!("Could not write `{path}`"))?;
        println!("Wrote summary to {path}");
    }
    Ok(())
}
