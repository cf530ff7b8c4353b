// fitbook/src/store/auth.rs

use super::status::SliceStatus;
use crate::model::User;
use crate::session::SignOutReason;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
  pub user: Option<User>,
  /// Set when the last sign-out was forced by a 401.
  pub session_expired: bool,
  pub status: SliceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
  Pending,
  SignedIn(User),
  SignedOut(SignOutReason),
  Rejected(String),
  Reset,
}

impl AuthState {
  pub fn reduce(&mut self, action: AuthAction) {
    match action {
      AuthAction::Pending => self.status.pending(),
      AuthAction::SignedIn(user) => {
        self.user = Some(user);
        self.session_expired = false;
        self.status.fulfilled();
      }
      AuthAction::SignedOut(reason) => {
        self.user = None;
        self.session_expired = reason == SignOutReason::Unauthorized;
      }
      AuthAction::Rejected(message) => self.status.rejected(message),
      AuthAction::Reset => self.status.reset(),
    }
  }
}
