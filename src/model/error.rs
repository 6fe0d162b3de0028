use itertools::Itertools;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication failed (HTTP 401): check the account email and API token")]
    Authentication,

    #[error("{resource} was not found or is not accessible (HTTP 404)")]
    NotFound { resource: String },

    #[error("Rate limit exceeded (HTTP 429): wait a few minutes before generating the report again")]
    RateLimited,

    #[error("Transport `{path}` failed: {reason}")]
    Transport { path: String, reason: String },

    #[error("{0}")]
    Resolution(String),

    #[error("{}", exhausted_message(.attempts))]
    Exhausted { attempts: Vec<(String, String)> },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render report: {0}")]
    Render(String),
}

impl Error {
    /// Terminal failures abort the whole fetch; anything else moves on to the next transport path.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Error::Authentication | Error::NotFound { .. } | Error::RateLimited
        )
    }

    pub(crate) fn transport(path: impl ToString, reason: impl ToString) -> Self {
        Error::Transport {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn exhausted_message(attempts: &[(String, String)]) -> String {
    let tried = if attempts.is_empty() {
        "  (no transport paths configured)".to_string()
    } else {
        attempts
            .iter()
            .map(|(path, reason)| format!("  - {path}: {reason}"))
            .join("\n")
    };
    format!(
        "Unable to reach the issue tracker through any transport path.\n\
         Tried:\n{tried}\n\
         To fix this, try one of the following:\n\
         \x20 1. Check that the base URL is correct and reachable (e.g. https://yourcompany.atlassian.net)\n\
         \x20 2. Start the first-party relay and pass it with --relay-url or in the transports file\n\
         \x20 3. Verify network access to the public relays listed in the transports file\n\
         \x20 4. Supply the sprint id directly with --sprint-id instead of a board reference"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_http_terminal_classes_are_terminal() {
        assert!(Error::Authentication.is_terminal());
        assert!(Error::RateLimited.is_terminal());
        assert!(Error::NotFound {
            resource: "Sprint 1".into()
        }
        .is_terminal());
        assert!(!Error::transport("direct", "connection refused").is_terminal());
        assert!(!Error::Resolution("no board".into()).is_terminal());
    }

    #[test]
    fn exhausted_message_lists_every_attempt() {
        let error = Error::Exhausted {
            attempts: vec![
                ("direct".into(), "HTTP 502".into()),
                ("relay".into(), "connection refused".into()),
            ],
        };
        let message = error.to_string();
        assert!(message.contains("  - direct: HTTP 502"));
        assert!(message.contains("  - relay: connection refused"));
        assert!(message.contains("--relay-url"));
    }
}
