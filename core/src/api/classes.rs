// fitbook/src/api/classes.rs

use super::client::ApiClient;
use crate::error::Result;
use crate::model::{ClassDraft, ClassFilters, ClassOffering};

impl ApiClient {
  pub async fn list_classes(&self, filters: &ClassFilters) -> Result<Vec<ClassOffering>> {
    self.get("classes", filters.to_pairs()).await
  }

  pub async fn get_class(&self, class_id: &str) -> Result<ClassOffering> {
    self.get(format!("classes/{}", class_id), Vec::new()).await
  }

  pub async fn create_class(&self, draft: &ClassDraft) -> Result<ClassOffering> {
    self.post("classes", draft).await
  }

  pub async fn update_class(&self, class_id: &str, draft: &ClassDraft) -> Result<ClassOffering> {
    self.put(format!("classes/{}", class_id), draft).await
  }

  pub async fn delete_class(&self, class_id: &str) -> Result<()> {
    self.delete(format!("classes/{}", class_id)).await?;
    Ok(())
  }

  pub async fn trainer_classes(&self, trainer_id: &str) -> Result<Vec<ClassOffering>> {
    self.get(format!("classes/trainer/{}", trainer_id), Vec::new()).await
  }

  pub async fn recommended_classes(&self, limit: u32) -> Result<Vec<ClassOffering>> {
    self
      .get("recommendations/classes", vec![("limit".to_string(), limit.to_string())])
      .await
  }
}
