use crate::jira::transport::{HttpGet, Shaping};
use crate::model::{Configuration, Error, RawIssue, Result, TransportPath};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

pub const PAGE_SIZE: u64 = 100;

static BOARD_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:/boards?/|rapidView=)(\d+)").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchProgress {
    PathStarted { path: String },
    PageFetched { path: String, fetched: usize, total: u64 },
}

pub type ProgressCallback = Box<dyn Fn(FetchProgress) + Send + Sync>;

#[derive(Debug, Deserialize)]
struct IssuePage {
    #[serde(default)]
    issues: Vec<RawIssue>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct SprintPage {
    #[serde(default)]
    values: Vec<SprintRef>,
}

#[derive(Debug, Deserialize)]
struct SprintRef {
    id: u64,
}

/// Extracts the board id from a board URL (`.../boards/42`, `...?rapidView=42`) or a bare number.
pub fn board_id_from(reference: &str) -> Option<u64> {
    let reference = reference.trim();
    if let Ok(id) = reference.parse() {
        return Some(id);
    }
    BOARD_ID
        .captures(reference)
        .and_then(|captures| captures[1].parse().ok())
}

/// Retrieves one sprint's issues, walking the configured transport paths in order.
pub struct SprintFetcher<'a, C> {
    client: &'a C,
    config: &'a Configuration,
    progress: Option<ProgressCallback>,
}

impl<'a, C: HttpGet> SprintFetcher<'a, C> {
    pub fn new(client: &'a C, config: &'a Configuration) -> Self {
        Self {
            client,
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, cb: impl Fn(FetchProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(cb));
        self
    }

    /// The configured sprint id, or the first active sprint of the referenced board.
    pub async fn resolve_sprint_id(&self) -> Result<u64> {
        if let Some(sprint_id) = self.config.sprint_id {
            return Ok(sprint_id);
        }
        let Some(reference) = self.config.board_reference.as_deref() else {
            return Err(Error::Resolution(
                "Either a sprint id or a board reference is required".into(),
            ));
        };
        let Some(board_id) = board_id_from(reference) else {
            return Err(Error::Resolution(format!(
                "Could not find a board id in `{reference}`"
            )));
        };

        let api_path = format!("/rest/agile/1.0/board/{board_id}/sprint?state=active");
        let resource = format!("Board {board_id}");
        let active = self
            .across_paths("active sprint lookup", move |path| {
                let api_path = api_path.clone();
                let resource = resource.clone();
                async move {
                    let payload = self.get_json(path, &api_path, &resource).await?;
                    let page: SprintPage = serde_json::from_value(payload).map_err(|e| {
                        Error::transport(&path.name, format!("unexpected sprint list: {e}"))
                    })?;
                    Ok(page.values.first().map(|sprint| sprint.id))
                }
            })
            .await?;

        match active {
            Some(sprint_id) => {
                info!(board_id, sprint_id, "resolved active sprint");
                Ok(sprint_id)
            }
            None => Err(Error::Resolution(format!(
                "No active sprint found for board {board_id}"
            ))),
        }
    }

    /// Every issue of the sprint. Pagination restarts from zero on each transport path.
    pub async fn fetch_issues(&self, sprint_id: u64) -> Result<Vec<RawIssue>> {
        let issues = self
            .across_paths("sprint issues", move |path| self.paginate(path, sprint_id))
            .await?;
        info!(sprint_id, count = issues.len(), "fetched sprint issues");
        Ok(issues)
    }

    /// Raw `GET /rest/api/2/field` payload.
    pub async fn fetch_field_metadata(&self) -> Result<Value> {
        self.across_paths("field metadata", move |path| {
            self.get_json(path, "/rest/api/2/field", "Field metadata")
        })
        .await
    }

    async fn across_paths<T, F, Fut>(&self, what: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut(&'a TransportPath) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let config: &'a Configuration = self.config;
        let mut attempts = vec![];
        for path in &config.transports {
            info!(path = %path.name, "{what}: trying transport path");
            self.report(FetchProgress::PathStarted {
                path: path.name.clone(),
            });
            match attempt(path).await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_terminal() => return Err(error),
                Err(error) => {
                    warn!(path = %path.name, %error, "{what}: transport path failed");
                    let reason = match error {
                        Error::Transport { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    attempts.push((path.name.clone(), reason));
                }
            }
        }
        Err(Error::Exhausted { attempts })
    }

    async fn paginate(&self, path: &TransportPath, sprint_id: u64) -> Result<Vec<RawIssue>> {
        let resource = format!("Sprint {sprint_id}");
        let mut issues = vec![];
        let mut start_at = 0;
        loop {
            let api_path = format!(
                "/rest/agile/1.0/sprint/{sprint_id}/issue?startAt={start_at}&maxResults={PAGE_SIZE}"
            );
            let payload = self.get_json(path, &api_path, &resource).await?;
            let page: IssuePage = serde_json::from_value(payload).map_err(|e| {
                Error::transport(&path.name, format!("unexpected issue page: {e}"))
            })?;
            let received = page.issues.len();
            debug!(path = %path.name, start_at, received, total = page.total, "page");
            issues.extend(page.issues);
            self.report(FetchProgress::PageFetched {
                path: path.name.clone(),
                fetched: issues.len(),
                total: page.total,
            });

            // The server may cap maxResults below PAGE_SIZE.
            start_at += received as u64;
            if received == 0 || start_at >= page.total {
                if issues.len() as u64 != page.total {
                    warn!(
                        expected = page.total,
                        received = issues.len(),
                        "sprint issue count differs from reported total"
                    );
                }
                return Ok(issues);
            }
        }
    }

    async fn get_json(&self, path: &TransportPath, api_path: &str, resource: &str) -> Result<Value> {
        let request = path.shape(self.config, api_path);
        let response = self
            .client
            .get(&request)
            .await
            .map_err(|e| Error::transport(&path.name, e))?;
        path.unwrap_response(response, resource)
    }

    fn report(&self, event: FetchProgress) {
        if let Some(progress) = &self.progress {
            progress(event);
        }
    }
}
