// fitbook/src/config.rs

use crate::error::{FitbookError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Header carrying the session token on every authenticated request.
pub const AUTH_HEADER: &str = "x-auth-token";

pub const DEFAULT_API_URL: &str = "http://localhost:4000/api";

#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL of the REST API, without a trailing slash.
  pub api_url: String,
  pub request_timeout: Duration,
  pub session_file: PathBuf,
  pub checkout_file: PathBuf,

  // Checkout confirmation retry.
  pub confirm_attempts: u32,
  pub confirm_backoff: Duration,

  /// Upper bound on waiting for the external payment step.
  pub charge_timeout: Duration,
}

impl ClientConfig {
  /// Defaults suitable for tests: everything local, short waits.
  pub fn new(api_url: impl Into<String>) -> Self {
    Self {
      api_url: normalize_base_url(api_url.into()),
      request_timeout: Duration::from_secs(30),
      session_file: PathBuf::from(".fitbook/session.json"),
      checkout_file: PathBuf::from(".fitbook/checkout.json"),
      confirm_attempts: 3,
      confirm_backoff: Duration::from_millis(500),
      charge_timeout: Duration::from_secs(60),
    }
  }

  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    let config = Self::from_lookup(|name| env::var(name).ok())?;
    tracing::info!(api_url = %config.api_url, "Client configuration loaded.");
    Ok(config)
  }

  /// Builds the configuration from an arbitrary variable source. Unset
  /// variables take their defaults; malformed numbers are rejected.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let number = |var_name: &str, default: u64| -> Result<u64> {
      match lookup(var_name) {
        None => Ok(default),
        Some(raw) => raw
          .trim()
          .parse::<u64>()
          .map_err(|e| FitbookError::Config(format!("Invalid {}: {}", var_name, e))),
      }
    };

    let api_url = lookup("FITBOOK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let confirm_attempts = number("FITBOOK_CONFIRM_ATTEMPTS", 3)?;
    if confirm_attempts == 0 {
      return Err(FitbookError::Config("FITBOOK_CONFIRM_ATTEMPTS must be at least 1".into()));
    }

    Ok(Self {
      api_url: normalize_base_url(api_url),
      request_timeout: Duration::from_secs(number("FITBOOK_TIMEOUT_SECS", 30)?),
      session_file: lookup("FITBOOK_SESSION_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".fitbook/session.json")),
      checkout_file: lookup("FITBOOK_CHECKOUT_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".fitbook/checkout.json")),
      confirm_attempts: u32::try_from(confirm_attempts)
        .map_err(|e| FitbookError::Config(format!("Invalid FITBOOK_CONFIRM_ATTEMPTS: {}", e)))?,
      confirm_backoff: Duration::from_millis(number("FITBOOK_CONFIRM_BACKOFF_MS", 500)?),
      charge_timeout: Duration::from_secs(number("FITBOOK_CHARGE_TIMEOUT_SECS", 60)?),
    })
  }

  pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
    self.session_file = path.into();
    self
  }

  pub fn with_checkout_file(mut self, path: impl Into<PathBuf>) -> Self {
    self.checkout_file = path.into();
    self
  }

  pub fn with_confirm_retry(mut self, attempts: u32, backoff: Duration) -> Self {
    self.confirm_attempts = attempts.max(1);
    self.confirm_backoff = backoff;
    self
  }

  pub fn with_charge_timeout(mut self, timeout: Duration) -> Self {
    self.charge_timeout = timeout;
    self
  }

  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.request_timeout = timeout;
    self
  }

  /// `api_url` joined with `path` (which may or may not start with `/`).
  pub fn endpoint(&self, path: &str) -> String {
    format!("{}/{}", self.api_url, path.trim_start_matches('/'))
  }
}

fn normalize_base_url(url: String) -> String {
  url.trim_end_matches('/').to_string()
}
