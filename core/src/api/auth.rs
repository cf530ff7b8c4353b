// fitbook/src/api/auth.rs

use super::client::{ack_message, ApiClient};
use super::transport::ApiRequest;
use crate::error::Result;
use crate::model::{Registration, User};
use crate::session::Session;
use serde::Deserialize;
use serde_json::{json, Value};

/// What `/auth/login` and `/auth/register` answer.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
  pub token: String,
  #[serde(default)]
  pub user: Option<User>,
}

impl ApiClient {
  /// Creates the account and signs in with the issued token.
  pub async fn register(&self, registration: &Registration) -> Result<User> {
    let response: AuthResponse = self.post("auth/register", registration).await?;
    self.sign_in_with(response).await
  }

  pub async fn login(&self, email: &str, password: &str) -> Result<User> {
    let response: AuthResponse = self
      .post("auth/login", &json!({ "email": email, "password": password }))
      .await?;
    self.sign_in_with(response).await
  }

  async fn sign_in_with(&self, response: AuthResponse) -> Result<User> {
    let user = match response.user {
      Some(user) => user,
      None => {
        self
          .call(ApiRequest::get("auth/me").with_token(response.token.clone()))
          .await?
      }
    };
    self
      .session()
      .establish(Session {
        token: response.token,
        user: user.clone(),
      })
      .await?;
    Ok(user)
  }

  pub async fn logout(&self) -> Result<()> {
    self.session().logout().await
  }

  pub async fn forgot_password(&self, email: &str) -> Result<Option<String>> {
    let body: Value = self.post("auth/forgot-password", &json!({ "email": email })).await?;
    Ok(ack_message(&body))
  }

  pub async fn reset_password(&self, reset_token: &str, password: &str) -> Result<Option<String>> {
    let body: Value = self
      .post(format!("auth/reset-password/{}", reset_token), &json!({ "password": password }))
      .await?;
    Ok(ack_message(&body))
  }

  pub async fn current_user(&self) -> Result<User> {
    self.get("auth/me", Vec::new()).await
  }
}
