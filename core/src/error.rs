// fitbook/src/error.rs

use crate::flow::FlowError;
use crate::model::{BookingStatus, Role};
use serde_json::Value;
use thiserror::Error;

/// Banner text shown when nothing more specific is known.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Failures of a single request against the backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
  /// Structured validation errors (`{"errors": [{"msg": ...}]}`).
  #[error("Validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),

  /// A non-2xx response carrying a single `msg` or `message`.
  #[error("Request failed ({status}): {message}")]
  Message { status: u16, message: String },

  /// 401: the credential is missing or was rejected. The session has been torn
  /// down by the time this is returned.
  #[error("Not authorized, please log in again")]
  Unauthorized,

  #[error("Network error: {0}")]
  Network(String),

  #[error("Unexpected response body: {0}")]
  Decode(String),
}

impl ApiError {
  /// Classifies an error response body the way the backend shapes it:
  /// express-validator arrays first, then `msg`, then `message`.
  pub fn from_response(status: u16, body: &Value) -> Self {
    if status == 401 {
      return ApiError::Unauthorized;
    }
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
      let messages: Vec<String> = errors
        .iter()
        .filter_map(|e| e.get("msg").and_then(Value::as_str).map(str::to_owned))
        .collect();
      if !messages.is_empty() {
        return ApiError::Validation(messages);
      }
    }
    let message = ["msg", "message", "error"]
      .iter()
      .find_map(|key| body.get(*key).and_then(Value::as_str))
      .map(str::to_owned)
      .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
    ApiError::Message { status, message }
  }

  pub fn user_message(&self) -> String {
    match self {
      ApiError::Validation(messages) => messages
        .first()
        .cloned()
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
      ApiError::Message { message, .. } => message.clone(),
      ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
      ApiError::Network(_) | ApiError::Decode(_) => GENERIC_ERROR_MESSAGE.to_string(),
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      ApiError::Decode(err.to_string())
    } else {
      ApiError::Network(err.to_string())
    }
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(err: serde_json::Error) -> Self {
    ApiError::Decode(err.to_string())
  }
}

#[derive(Debug, Error)]
pub enum FitbookError {
  #[error(transparent)]
  Api(#[from] ApiError),

  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("You must be logged in to do that")]
  NotAuthenticated,

  #[error("This action requires the {required} role")]
  Forbidden { required: Role },

  #[error("Booking cannot move from {from} to {to}")]
  InvalidTransition { from: BookingStatus, to: BookingStatus },

  #[error("Booking cannot be cancelled: {0}")]
  CancellationNotAllowed(String),

  #[error("Payment was declined: {0}")]
  Charge(String),

  #[error("Payment intent {intent_id} has already been confirmed")]
  DuplicateConfirmation { intent_id: String },

  /// Money was captured by the processor but the backend never acknowledged
  /// the confirmation. The checkpoint is kept for out-of-band reconciliation.
  #[error("Payment {intent_id} was captured but could not be confirmed: {last_error}")]
  PaymentCapturedUnconfirmed { intent_id: String, last_error: String },

  #[error("No checkout is in progress")]
  NoCheckoutInProgress,

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Storage Error: {0}")]
  Storage(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Error: {0}")]
  Internal(String),
}

impl FitbookError {
  /// The single line a view shows in its error banner.
  pub fn user_message(&self) -> String {
    match self {
      FitbookError::Api(api) => api.user_message(),
      FitbookError::Validation(message) => message.clone(),
      FitbookError::Workflow { .. } | FitbookError::Internal(_) | FitbookError::Storage(_) => {
        GENERIC_ERROR_MESSAGE.to_string()
      }
      other => other.to_string(),
    }
  }

  pub fn is_unauthorized(&self) -> bool {
    matches!(self, FitbookError::Api(ApiError::Unauthorized))
  }
}

impl From<anyhow::Error> for FitbookError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<FitbookError>() {
      Ok(inner) => inner,
      Err(err) => FitbookError::Internal(err.to_string()),
    }
  }
}

impl From<std::io::Error> for FitbookError {
  fn from(err: std::io::Error) -> Self {
    FitbookError::Storage(err.to_string())
  }
}

pub type Result<T, E = FitbookError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn validation_array_wins_and_first_message_is_shown() {
    let body = json!({"errors": [{"msg": "Slot is full"}, {"msg": "Date invalid"}], "msg": "ignored"});
    let err = ApiError::from_response(400, &body);
    assert_eq!(err, ApiError::Validation(vec!["Slot is full".into(), "Date invalid".into()]));
    assert_eq!(err.user_message(), "Slot is full");
  }

  #[test]
  fn msg_then_message_then_fallback() {
    assert_eq!(ApiError::from_response(404, &json!({"msg": "Booking not found"})).user_message(), "Booking not found");
    assert_eq!(ApiError::from_response(500, &json!({"message": "Server down"})).user_message(), "Server down");
    assert_eq!(ApiError::from_response(500, &json!({})).user_message(), GENERIC_ERROR_MESSAGE);
  }

  #[test]
  fn status_401_is_unauthorized_regardless_of_body() {
    assert_eq!(ApiError::from_response(401, &json!({"msg": "Token is not valid"})), ApiError::Unauthorized);
  }

  #[test]
  fn network_errors_use_generic_banner() {
    let err = FitbookError::from(ApiError::Network("connection refused".into()));
    assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
  }
}
