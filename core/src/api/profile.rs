// fitbook/src/api/profile.rs

use super::client::{decode, unwrap_field, ApiClient};
use crate::error::Result;
use crate::model::{Profile, ProfileUpdate};
use serde_json::Value;

impl ApiClient {
  pub async fn get_profile(&self) -> Result<Profile> {
    let body: Value = self.get("profile", Vec::new()).await?;
    decode(unwrap_field(body, "profile"))
  }

  pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
    let body: Value = self.put("profile", update).await?;
    decode(unwrap_field(body, "profile"))
  }
}
