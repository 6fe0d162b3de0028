use crate::model::{Error, Result, TransportPath};

/// Everything one report generation needs. Built by the caller, validated once.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    /// Empty means "detect the story points field".
    pub story_points_field: String,
    pub board_reference: Option<String>,
    pub sprint_id: Option<u64>,
    pub transports: Vec<TransportPath>,
    pub scan_references: bool,
}

impl Configuration {
    pub fn new(
        base_url: impl ToString,
        email: impl ToString,
        api_token: impl ToString,
    ) -> Self {
        Self {
            base_url: base_url.to_string(),
            email: email.to_string(),
            api_token: api_token.to_string(),
            story_points_field: String::new(),
            board_reference: None,
            sprint_id: None,
            transports: vec![TransportPath::direct()],
            scan_references: false,
        }
    }

    pub fn with_sprint_id(mut self, sprint_id: u64) -> Self {
        self.sprint_id = Some(sprint_id);
        self
    }

    pub fn with_board_reference(mut self, board: impl ToString) -> Self {
        self.board_reference = Some(board.to_string());
        self
    }

    pub fn with_story_points_field(mut self, field: impl ToString) -> Self {
        self.story_points_field = field.to_string();
        self
    }

    pub fn with_transports(mut self, transports: Vec<TransportPath>) -> Self {
        self.transports = transports;
        self
    }

    pub fn with_reference_scan(mut self, enabled: bool) -> Self {
        self.scan_references = enabled;
        self
    }

    /// Normalizes the base URL and checks that a fetch can start.
    pub fn validate(mut self) -> Result<Self> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        self.story_points_field = self.story_points_field.trim().to_string();
        self.board_reference = self
            .board_reference
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        if self.base_url.is_empty() {
            return Err(Error::Config("base URL is required".into()));
        }
        if self.email.trim().is_empty() {
            return Err(Error::Config("account email is required".into()));
        }
        if self.api_token.trim().is_empty() {
            return Err(Error::Config("API token is required".into()));
        }
        if self.transports.is_empty() {
            return Err(Error::Config("at least one transport path is required".into()));
        }
        if self.sprint_id.is_none() && self.board_reference.is_none() {
            return Err(Error::Resolution(
                "Either a sprint id or a board reference is required".into(),
            ));
        }
        Ok(self)
    }

    pub fn story_points_field(&self) -> Option<&str> {
        Some(self.story_points_field.as_str()).filter(|f| !f.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_strips_trailing_slash() {
        let config = Configuration::new("https://acme.atlassian.net/ ", "a@b.c", "token")
            .with_sprint_id(7)
            .validate()
            .unwrap();
        assert_eq!(config.base_url, "https://acme.atlassian.net");
    }

    #[test]
    fn validate_requires_sprint_or_board() {
        let result = Configuration::new("https://acme.atlassian.net", "a@b.c", "token")
            .with_board_reference("   ")
            .validate();
        assert!(matches!(result, Err(Error::Resolution(_))));
    }

    #[test]
    fn validate_rejects_empty_chain() {
        let result = Configuration::new("https://acme.atlassian.net", "a@b.c", "token")
            .with_sprint_id(1)
            .with_transports(vec![])
            .validate();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn empty_story_points_field_means_detect() {
        let config = Configuration::new("https://x", "a@b.c", "t").with_story_points_field("");
        assert_eq!(config.story_points_field(), None);
        let config = config.with_story_points_field("customfield_10016");
        assert_eq!(config.story_points_field(), Some("customfield_10016"));
    }
}
