// fitbook/src/store/profile.rs

use super::status::SliceStatus;
use crate::model::Profile;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileState {
  pub profile: Option<Profile>,
  /// Set by a successful update only, so a view can say "saved".
  pub update_success: bool,
  pub status: SliceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileAction {
  Pending,
  Loaded(Profile),
  Updated(Profile),
  Rejected(String),
  ResetUpdateStatus,
  Reset,
}

impl ProfileState {
  pub fn reduce(&mut self, action: ProfileAction) {
    match action {
      ProfileAction::Pending => {
        self.update_success = false;
        self.status.pending();
      }
      ProfileAction::Loaded(profile) => {
        self.profile = Some(profile);
        self.status.fulfilled();
      }
      ProfileAction::Updated(profile) => {
        self.profile = Some(profile);
        self.update_success = true;
        self.status.fulfilled();
      }
      ProfileAction::Rejected(message) => self.status.rejected(message),
      ProfileAction::ResetUpdateStatus => self.update_success = false,
      ProfileAction::Reset => self.status.reset(),
    }
  }
}
