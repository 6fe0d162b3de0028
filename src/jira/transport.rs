use crate::model::{Configuration, Envelope, Error, RequestShape, Result, TransportPath};
use base64::engine::general_purpose;
use base64::Engine;
use serde_json::Value;
use std::future::Future;
use thiserror::Error;
use tracing::debug;

const HTTP_UNAUTHORIZED: u16 = 401;
const HTTP_NOT_FOUND: u16 = 404;
const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// A GET request after a transport path has decided where it goes and what it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl ToString) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// The request never produced an HTTP status (DNS, refused connection, TLS, cross-origin block).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct NetworkError(pub String);

impl From<reqwest::Error> for NetworkError {
    fn from(error: reqwest::Error) -> Self {
        NetworkError(error.to_string())
    }
}

/// The only place the fetch layer suspends.
pub trait HttpGet {
    fn get(
        &self,
        request: &ShapedRequest,
    ) -> impl Future<Output = std::result::Result<RawResponse, NetworkError>>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

impl HttpGet for ReqwestClient {
    async fn get(
        &self,
        request: &ShapedRequest,
    ) -> std::result::Result<RawResponse, NetworkError> {
        let mut builder = self.inner.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse::new(status, body))
    }
}

pub trait Shaping {
    /// Addresses `api_path` (path and query under the base URL) for this path.
    fn shape(&self, config: &Configuration, api_path: &str) -> ShapedRequest;

    /// Classifies the status and recovers the API payload from the body.
    fn unwrap_response(&self, response: RawResponse, resource: &str) -> Result<Value>;
}

impl Shaping for TransportPath {
    fn shape(&self, config: &Configuration, api_path: &str) -> ShapedRequest {
        let target = format!("{}{}", config.base_url, api_path);
        let mut headers = vec![
            ("Authorization".to_string(), basic_auth(&config.email, &config.api_token)),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        let url = match &self.shape {
            RequestShape::Direct => target,
            RequestShape::DomainHeader { endpoint, header } => {
                headers.push((header.clone(), config.base_url.clone()));
                format!("{endpoint}{api_path}")
            }
            RequestShape::Prefix { prefix } => {
                format!("{prefix}{}", urlencoding::encode(&target))
            }
        };
        debug!(path = %self.name, %url, "shaped request");
        ShapedRequest { url, headers }
    }

    fn unwrap_response(&self, response: RawResponse, resource: &str) -> Result<Value> {
        classify_status(response.status, resource, &self.name)?;
        let body: Value = serde_json::from_str(&response.body)
            .map_err(|e| Error::transport(&self.name, format!("unreadable response body: {e}")))?;
        match self.envelope {
            Envelope::Raw => Ok(body),
            Envelope::Contents => {
                if let Some(code) = body["status"]["http_code"].as_u64() {
                    let Ok(code) = u16::try_from(code) else {
                        return Err(Error::transport(
                            &self.name,
                            format!("relay reported invalid status {code}"),
                        ));
                    };
                    classify_status(code, resource, &self.name)?;
                }
                let Some(contents) = body["contents"].as_str() else {
                    return Err(Error::transport(&self.name, "relay envelope has no 'contents'"));
                };
                serde_json::from_str(contents).map_err(|e| {
                    Error::transport(&self.name, format!("unreadable relay contents: {e}"))
                })
            }
        }
    }
}

fn classify_status(status: u16, resource: &str, path: &str) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        HTTP_UNAUTHORIZED => Err(Error::Authentication),
        HTTP_NOT_FOUND => Err(Error::NotFound {
            resource: resource.to_string(),
        }),
        HTTP_TOO_MANY_REQUESTS => Err(Error::RateLimited),
        other => Err(Error::transport(path, format!("HTTP {other}"))),
    }
}

pub fn basic_auth(email: &str, api_token: &str) -> String {
    let credentials = format!("{email}:{api_token}");
    format!("Basic {}", general_purpose::STANDARD.encode(credentials))
}
