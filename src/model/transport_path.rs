use crate::model::{Error, Result};
use indexmap::IndexMap;
use serde_json::{from_str, Value};
use std::fs;

/// How a request for the remote API is addressed when sent through this path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestShape {
    Direct,
    /// First-party relay: the target domain travels in `header`.
    DomainHeader { endpoint: String, header: String },
    /// Public relay: the full target URL is url-encoded and appended to `prefix`.
    Prefix { prefix: String },
}

/// How the API payload is recovered from the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Raw,
    /// `{"contents": "<json text>", "status": {"http_code": 200}}`
    Contents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportPath {
    pub name: String,
    pub shape: RequestShape,
    pub envelope: Envelope,
}

// New
impl TransportPath {
    pub fn new(name: impl ToString, shape: RequestShape, envelope: Envelope) -> Self {
        Self {
            name: name.to_string(),
            shape,
            envelope,
        }
    }

    pub fn direct() -> Self {
        Self::new("direct", RequestShape::Direct, Envelope::Raw)
    }

    pub fn relay(endpoint: impl ToString) -> Self {
        Self::new(
            "relay",
            RequestShape::DomainHeader {
                endpoint: endpoint.to_string().trim_end_matches('/').to_string(),
                header: "X-Jira-Domain".to_string(),
            },
            Envelope::Raw,
        )
    }

    pub fn from_config(path: &str) -> Result<Vec<Self>> {
        let json_str = fs::read_to_string(path)?;
        Self::parse(&json_str)
    }
}

// Parser
impl TransportPath {
    pub(crate) fn parse(json_str: &str) -> Result<Vec<Self>> {
        let elements: IndexMap<String, Value> = from_str(json_str)?;
        let mut result = Vec::new();
        for (name, details) in elements {
            let Some(shape) = details["shape"].as_str() else {
                return Err(Error::Config(format!("`{name}`: not found 'shape' field")));
            };
            let shape = match shape {
                "direct" => RequestShape::Direct,
                "domain-header" => {
                    let Some(endpoint) = details["endpoint"].as_str() else {
                        return Err(Error::Config(format!(
                            "`{name}`: not found 'endpoint' field"
                        )));
                    };
                    let header = details["header"].as_str().unwrap_or("X-Jira-Domain");
                    RequestShape::DomainHeader {
                        endpoint: endpoint.trim_end_matches('/').to_string(),
                        header: header.to_string(),
                    }
                }
                "prefix" => {
                    let Some(prefix) = details["prefix"].as_str() else {
                        return Err(Error::Config(format!("`{name}`: not found 'prefix' field")));
                    };
                    RequestShape::Prefix {
                        prefix: prefix.to_string(),
                    }
                }
                other => {
                    return Err(Error::Config(format!(
                        "`{name}`: unknown shape `{other}`"
                    )))
                }
            };
            let envelope = match details["envelope"].as_str() {
                None | Some("raw") => Envelope::Raw,
                Some("contents") => Envelope::Contents,
                Some(other) => {
                    return Err(Error::Config(format!(
                        "`{name}`: unknown envelope `{other}`"
                    )))
                }
            };
            result.push(Self::new(name, shape, envelope));
        }
        Ok(result)
    }
}
