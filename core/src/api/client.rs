// fitbook/src/api/client.rs

use super::transport::{ApiRequest, HttpTransport, Transport};
use crate::config::ClientConfig;
use crate::error::{ApiError, FitbookError, Result};
use crate::session::SessionContext;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Typed access to the backend on behalf of one [`SessionContext`].
#[derive(Debug, Clone)]
pub struct ApiClient {
  transport: Arc<dyn Transport>,
  session: SessionContext,
}

impl ApiClient {
  pub fn new(transport: Arc<dyn Transport>, session: SessionContext) -> Self {
    Self { transport, session }
  }

  /// Client over real HTTP.
  pub fn http(config: &ClientConfig, session: SessionContext) -> Result<Self> {
    Ok(Self::new(Arc::new(HttpTransport::new(config)?), session))
  }

  pub fn session(&self) -> &SessionContext {
    &self.session
  }

  /// Sends `request` and returns the success body.
  ///
  /// The session token is attached unless the request already carries one.
  /// A 401 tears the session down before `ApiError::Unauthorized` is
  /// returned; other non-2xx answers are classified by
  /// [`ApiError::from_response`].
  #[instrument(name = "ApiClient::send", skip_all, fields(method = %request.method, path = %request.path))]
  pub async fn send(&self, mut request: ApiRequest) -> Result<Value> {
    if request.token.is_none() {
      request.token = self.session.token();
    }

    let response = self.transport.send(request).await.map_err(FitbookError::from)?;

    if response.status == 401 {
      event!(Level::WARN, "Backend rejected the session token; signing out.");
      self.session.teardown_unauthorized().await;
      return Err(ApiError::Unauthorized.into());
    }
    if !response.is_success() {
      let err = ApiError::from_response(response.status, &response.body);
      event!(Level::DEBUG, status = response.status, error = %err, "Request failed.");
      return Err(err.into());
    }
    Ok(response.body)
  }

  pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
    let body = self.send(request).await?;
    decode(body)
  }

  pub(crate) async fn get<T: DeserializeOwned>(&self, path: impl Into<String>, query: Vec<(String, String)>) -> Result<T> {
    self.call(ApiRequest::get(path).with_query(query)).await
  }

  pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: impl Into<String>, body: &B) -> Result<T> {
    self.call(ApiRequest::post(path, to_body(body)?)).await
  }

  pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: impl Into<String>, body: &B) -> Result<T> {
    self.call(ApiRequest::put(path, to_body(body)?)).await
  }

  pub(crate) async fn delete(&self, path: impl Into<String>) -> Result<Value> {
    self.send(ApiRequest::delete(path)).await
  }
}

pub(crate) fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
  serde_json::from_value(body).map_err(|e| ApiError::from(e).into())
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
  serde_json::to_value(body).map_err(|e| FitbookError::Internal(format!("Failed to encode request body: {}", e)))
}

/// Some endpoints answer with the document itself, others wrap it under a
/// key (`{"payment": {...}}`). Returns the wrapped value when present.
pub(crate) fn unwrap_field(body: Value, key: &str) -> Value {
  match body {
    Value::Object(mut map) if map.get(key).is_some_and(Value::is_object) => map.remove(key).unwrap_or(Value::Null),
    other => other,
  }
}

/// The acknowledgement text of bodies like `{"msg": "Email sent"}`.
pub(crate) fn ack_message(body: &Value) -> Option<String> {
  ["msg", "message"]
    .iter()
    .find_map(|key| body.get(*key).and_then(Value::as_str))
    .map(str::to_owned)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn unwraps_only_object_fields() {
    assert_eq!(unwrap_field(json!({"payment": {"_id": "p1"}}), "payment"), json!({"_id": "p1"}));
    assert_eq!(unwrap_field(json!({"_id": "p1", "payment": "x"}), "payment"), json!({"_id": "p1", "payment": "x"}));
  }

  #[test]
  fn ack_prefers_msg() {
    assert_eq!(ack_message(&json!({"msg": "Email sent", "message": "x"})).as_deref(), Some("Email sent"));
    assert_eq!(ack_message(&Value::Null), None);
  }
}
