// fitbook/src/session.rs

//! The signed-in session, held explicitly and handed to whoever needs it.
//!
//! A [`SessionContext`] is created once at start-up, restored from its
//! [`SessionStore`], and cloned into the API client. Every 401 from the
//! backend goes through [`SessionContext::teardown_unauthorized`], so the
//! view only ever has to ask [`SessionContext::login_required`].

use crate::error::{FitbookError, Result};
use crate::model::{Role, User};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{event, Level};

/// Bearer credential plus the user it was issued to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub token: String,
  pub user: User,
}

impl fmt::Debug for Session {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Session")
      .field("token", &"[REDACTED]")
      .field("user", &self.user)
      .finish()
  }
}

/// Why there is no session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
  /// Nothing was stored, or the stored session was unreadable.
  NoSession,
  LoggedOut,
  /// The backend rejected the credential.
  Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
  SignedOut { reason: SignOutReason },
  SignedIn(User),
}

/// Where the session survives between runs.
#[async_trait]
pub trait SessionStore: Send + Sync + fmt::Debug {
  async fn load(&self) -> Result<Option<Session>>;
  async fn save(&self, session: &Session) -> Result<()>;
  async fn clear(&self) -> Result<()>;
}

/// JSON file on disk, the equivalent of the browser's local storage entry.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
  path: PathBuf,
}

impl FileSessionStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

#[async_trait]
impl SessionStore for FileSessionStore {
  async fn load(&self) -> Result<Option<Session>> {
    let raw = match tokio::fs::read(&self.path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    match serde_json::from_slice(&raw) {
      Ok(session) => Ok(Some(session)),
      Err(e) => {
        event!(Level::WARN, path = %self.path.display(), error = %e, "Ignoring unreadable session file.");
        Ok(None)
      }
    }
  }

  async fn save(&self, session: &Session) -> Result<()> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    let raw = serde_json::to_vec_pretty(session).map_err(|e| FitbookError::Storage(e.to_string()))?;
    tokio::fs::write(&self.path, raw).await?;
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
pub struct MemorySessionStore {
  slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_session(session: Session) -> Self {
    Self {
      slot: Mutex::new(Some(session)),
    }
  }

  pub fn stored(&self) -> Option<Session> {
    self.slot.lock().clone()
  }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
  async fn load(&self) -> Result<Option<Session>> {
    Ok(self.slot.lock().clone())
  }

  async fn save(&self, session: &Session) -> Result<()> {
    *self.slot.lock() = Some(session.clone());
    Ok(())
  }

  async fn clear(&self) -> Result<()> {
    *self.slot.lock() = None;
    Ok(())
  }
}

#[derive(Debug)]
struct Inner {
  store: Arc<dyn SessionStore>,
  current: RwLock<Option<Session>>,
  last_reason: RwLock<SignOutReason>,
}

/// Cheap to clone; all clones see the same session.
#[derive(Debug, Clone)]
pub struct SessionContext {
  inner: Arc<Inner>,
}

impl SessionContext {
  pub fn new(store: Arc<dyn SessionStore>) -> Self {
    Self {
      inner: Arc::new(Inner {
        store,
        current: RwLock::new(None),
        last_reason: RwLock::new(SignOutReason::NoSession),
      }),
    }
  }

  /// Session context that keeps nothing between runs.
  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemorySessionStore::new()))
  }

  /// Loads whatever the store holds. Returns the resulting state.
  pub async fn restore(&self) -> Result<SessionState> {
    let loaded = self.inner.store.load().await?;
    if let Some(session) = &loaded {
      event!(Level::DEBUG, user_id = %session.user.id, "Session restored.");
    }
    *self.inner.current.write() = loaded;
    Ok(self.state())
  }

  /// Installs a freshly issued session and persists it.
  pub async fn establish(&self, session: Session) -> Result<()> {
    self.inner.store.save(&session).await?;
    event!(Level::INFO, user_id = %session.user.id, role = %session.user.role, "Signed in.");
    *self.inner.current.write() = Some(session);
    Ok(())
  }

  pub async fn logout(&self) -> Result<()> {
    self.sign_out(SignOutReason::LoggedOut).await
  }

  /// Forced logout after the backend answered 401. Storage failures are
  /// logged, not returned: the in-memory session is gone either way.
  pub async fn teardown_unauthorized(&self) {
    if let Err(e) = self.sign_out(SignOutReason::Unauthorized).await {
      event!(Level::ERROR, error = %e, "Failed to clear stored session after 401.");
    }
  }

  async fn sign_out(&self, reason: SignOutReason) -> Result<()> {
    let had_session = self.inner.current.write().take().is_some();
    *self.inner.last_reason.write() = reason;
    if had_session {
      event!(Level::INFO, ?reason, "Signed out.");
    }
    self.inner.store.clear().await
  }

  pub fn state(&self) -> SessionState {
    match self.inner.current.read().as_ref() {
      Some(session) => SessionState::SignedIn(session.user.clone()),
      None => SessionState::SignedOut {
        reason: *self.inner.last_reason.read(),
      },
    }
  }

  pub fn login_required(&self) -> bool {
    self.inner.current.read().is_none()
  }

  pub fn token(&self) -> Option<String> {
    self.inner.current.read().as_ref().map(|s| s.token.clone())
  }

  pub fn user(&self) -> Option<User> {
    self.inner.current.read().as_ref().map(|s| s.user.clone())
  }

  pub fn require_user(&self) -> Result<User> {
    self.user().ok_or(FitbookError::NotAuthenticated)
  }

  pub fn require_role(&self, required: Role) -> Result<User> {
    let user = self.require_user()?;
    if user.role != required {
      return Err(FitbookError::Forbidden { required });
    }
    Ok(user)
  }
}
