// fitbook/src/api/trainers.rs

use super::client::ApiClient;
use crate::error::Result;
use crate::model::{Review, ReviewDraft, Trainer, TrainerFilters};
use serde_json::json;

impl ApiClient {
  pub async fn list_trainers(&self, filters: &TrainerFilters) -> Result<Vec<Trainer>> {
    self.get("trainers", filters.to_pairs()).await
  }

  pub async fn get_trainer(&self, trainer_id: &str) -> Result<Trainer> {
    self.get(format!("trainers/{}", trainer_id), Vec::new()).await
  }

  pub async fn trainer_reviews(&self, trainer_id: &str) -> Result<Vec<Review>> {
    self.get(format!("trainers/{}/reviews", trainer_id), Vec::new()).await
  }

  pub async fn add_review(&self, trainer_id: &str, draft: &ReviewDraft) -> Result<Review> {
    self.post(format!("trainers/{}/reviews", trainer_id), draft).await
  }

  pub async fn respond_to_review(&self, review_id: &str, response: &str) -> Result<Review> {
    self
      .put(format!("trainers/reviews/{}/respond", review_id), &json!({ "response": response }))
      .await
  }
}
