// fitbook/src/model/trainer.rs

use super::Identified;
use crate::error::{FitbookError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
  #[serde(rename = "_id", alias = "id")]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default)]
  pub profile: TrainerProfile,
}

impl Identified for Trainer {
  fn id(&self) -> &str {
    &self.id
  }
}

/// Public part of a trainer's profile. `rating` is the review aggregate and is
/// absent until the first review lands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainerProfile {
  pub bio: String,
  pub specialties: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rating: Option<f64>,
  pub review_count: u32,
  pub years_of_experience: u32,
  pub qualifications: String,
  pub teaching_style: String,
  pub availability_preferences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  #[serde(rename = "_id", alias = "id")]
  pub id: String,
  #[serde(default)]
  pub trainer_id: String,
  #[serde(default)]
  pub client_name: String,
  pub rating: u8,
  #[serde(default)]
  pub comment: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub trainer_response: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Review {
  fn id(&self) -> &str {
    &self.id
  }
}

/// Body of `POST /trainers/:id/reviews`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewDraft {
  pub rating: u8,
  pub comment: String,
}

impl ReviewDraft {
  pub fn new(rating: u8, comment: impl Into<String>) -> Self {
    Self {
      rating,
      comment: comment.into(),
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.rating == 0 {
      return Err(FitbookError::Validation("Please select a rating".into()));
    }
    if self.rating > 5 {
      return Err(FitbookError::Validation("Rating must be between 1 and 5".into()));
    }
    if self.comment.trim().is_empty() {
      return Err(FitbookError::Validation("Please provide a comment".into()));
    }
    Ok(())
  }
}

/// Query for `GET /trainers`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainerFilters {
  pub specialty: Option<String>,
  pub availability: Option<String>,
  /// Minimum rating.
  pub rating: Option<f64>,
}

impl TrainerFilters {
  pub fn to_pairs(&self) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in [("specialty", &self.specialty), ("availability", &self.availability)] {
      if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        pairs.push((key.to_string(), v.to_string()));
      }
    }
    if let Some(rating) = self.rating.filter(|r| *r > 0.0) {
      pairs.push(("rating".to_string(), rating.to_string()));
    }
    pairs
  }
}
