// fitbook/src/checkout/checkpoint.rs

use super::state::CheckoutCheckpoint;
use crate::error::{FitbookError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{event, Level};

/// Durable home of the single in-progress checkout.
#[async_trait]
pub trait CheckpointStore: Send + Sync + fmt::Debug {
  async fn load(&self) -> Result<Option<CheckoutCheckpoint>>;
  async fn save(&self, checkpoint: &CheckoutCheckpoint) -> Result<()>;
  async fn clear(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
  path: PathBuf,
}

impl FileCheckpointStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
  async fn load(&self) -> Result<Option<CheckoutCheckpoint>> {
    let raw = match tokio::fs::read(&self.path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    // A checkpoint may describe captured money; refuse to silently drop it.
    serde_json::from_slice(&raw).map(Some).map_err(|e| {
      FitbookError::Storage(format!("Checkout checkpoint {} is unreadable: {}", self.path.display(), e))
    })
  }

  /// Writes to a sibling temp file and renames it over the checkpoint.
  async fn save(&self, checkpoint: &CheckoutCheckpoint) -> Result<()> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    let raw = serde_json::to_vec_pretty(checkpoint).map_err(|e| FitbookError::Storage(e.to_string()))?;
    let tmp = self.path.with_extension("json.tmp");
    tokio::fs::write(&tmp, raw).await?;
    tokio::fs::rename(&tmp, &self.path).await?;
    event!(Level::TRACE, phase = %checkpoint.phase, "Checkpoint written.");
    Ok(())
  }

  async fn clear(&self) -> Result<()> {
    match tokio::fs::remove_file(&self.path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
  slot: Mutex<Option<CheckoutCheckpoint>>,
}

impl MemoryCheckpointStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn stored(&self) -> Option<CheckoutCheckpoint> {
    self.slot.lock().clone()
  }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
  async fn load(&self) -> Result<Option<CheckoutCheckpoint>> {
    Ok(self.slot.lock().clone())
  }

  async fn save(&self, checkpoint: &CheckoutCheckpoint) -> Result<()> {
    *self.slot.lock() = Some(checkpoint.clone());
    Ok(())
  }

  async fn clear(&self) -> Result<()> {
    *self.slot.lock() = None;
    Ok(())
  }
}
