// fitbook/src/api/transport.rs

use crate::config::{ClientConfig, AUTH_HEADER};
use crate::error::{ApiError, FitbookError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Post,
  Put,
  Delete,
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Method::Get => "GET",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Delete => "DELETE",
    })
  }
}

/// One call against the API, relative to the configured base URL.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
  pub method: Method,
  pub path: String,
  pub query: Vec<(String, String)>,
  pub body: Option<Value>,
  /// Sent as the `x-auth-token` header when present.
  pub token: Option<String>,
}

impl ApiRequest {
  pub fn new(method: Method, path: impl Into<String>) -> Self {
    Self {
      method,
      path: path.into(),
      query: Vec::new(),
      body: None,
      token: None,
    }
  }

  pub fn get(path: impl Into<String>) -> Self {
    Self::new(Method::Get, path)
  }

  pub fn post(path: impl Into<String>, body: Value) -> Self {
    Self::new(Method::Post, path).with_body(body)
  }

  pub fn put(path: impl Into<String>, body: Value) -> Self {
    Self::new(Method::Put, path).with_body(body)
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self::new(Method::Delete, path)
  }

  pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
    self.query = query;
    self
  }

  pub fn with_body(mut self, body: Value) -> Self {
    self.body = Some(body);
    self
  }

  pub fn with_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }
}

impl fmt::Debug for ApiRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ApiRequest")
      .field("method", &self.method)
      .field("path", &self.path)
      .field("query", &self.query)
      .field("body", &self.body)
      .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
      .finish()
  }
}

/// Status plus JSON body. An empty body is `Value::Null`; a non-JSON error
/// body is kept as a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
  pub status: u16,
  pub body: Value,
}

impl ApiResponse {
  pub fn new(status: u16, body: Value) -> Self {
    Self { status, body }
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Moves an [`ApiRequest`] to the backend and brings back whatever it
/// answered. Non-2xx statuses are not errors at this level.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
  async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, ApiError>;
}

/// `reqwest` over HTTPS (rustls).
#[derive(Debug, Clone)]
pub struct HttpTransport {
  client: Client,
  base_url: String,
}

impl HttpTransport {
  pub fn new(config: &ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.request_timeout)
      .build()
      .map_err(|e| FitbookError::Config(format!("Failed to build HTTP client: {}", e)))?;
    Ok(Self {
      client,
      base_url: config.api_url.clone(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, ApiError> {
    let url = self.url(&request.path);
    let mut builder = match request.method {
      Method::Get => self.client.get(&url),
      Method::Post => self.client.post(&url),
      Method::Put => self.client.put(&url),
      Method::Delete => self.client.delete(&url),
    };
    if !request.query.is_empty() {
      builder = builder.query(&request.query);
    }
    if let Some(token) = &request.token {
      builder = builder.header(AUTH_HEADER, token);
    }
    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let text = response.text().await?;
    let body = if text.trim().is_empty() {
      Value::Null
    } else {
      match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) if (200..300).contains(&status) => return Err(e.into()),
        Err(_) => Value::String(text),
      }
    };
    Ok(ApiResponse { status, body })
  }
}
