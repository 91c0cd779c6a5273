//! HTTP client for the Ionic API.
//!
//! Every response is a JSON envelope, either `{data, meta}` or
//! `{error, meta}`. [`ApiClient::send`] decodes it into an [`ApiResponse`];
//! [`ApiResponse::into_data`] turns the error side into [`crate::Error::Api`].

use std::time::Duration;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("ionic-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Success { data: Value, meta: ResponseMeta },
    Error { error: ApiErrorBody, meta: ResponseMeta },
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    pub fn meta(&self) -> &ResponseMeta {
        match self {
            ApiResponse::Success { meta, .. } | ApiResponse::Error { meta, .. } => meta,
        }
    }

    pub fn into_data(self, request: &ApiRequest) -> Result<Value> {
        match self {
            ApiResponse::Success { data, .. } => Ok(data),
            ApiResponse::Error { error, meta } => Err(request.fault(meta.status, error.message)),
        }
    }
}

/// A request built by [`ApiClient::make`], not yet sent.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    bearer: Option<String>,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn json(mut self, body: impl Serialize) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn fault(&self, status: u16, message: impl Into<String>) -> Error {
        Error::Api {
            method: self.method.to_string(),
            url: self.url.clone(),
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn make(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            query: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut url = url::Url::parse(&request.url)
            .map_err(|e| request.fault(0, format!("Invalid URL: {}", e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header("content-type", "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, url = %request.url, "api request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        serde_json::from_str::<ApiResponse>(&text).map_err(|_| {
            request.fault(status, format!("Unexpected response format: {}", truncate(&text)))
        })
    }
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
