// fitbook/src/store/status.rs

use crate::model::Identified;

/// Request bookkeeping every slice carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceStatus {
  pub is_loading: bool,
  pub is_success: bool,
  pub is_error: bool,
  /// Banner text of the last failure; empty otherwise.
  pub message: String,
}

impl SliceStatus {
  pub fn pending(&mut self) {
    self.is_loading = true;
    self.is_error = false;
  }

  pub fn fulfilled(&mut self) {
    self.is_loading = false;
    self.is_success = true;
    self.is_error = false;
    self.message.clear();
  }

  pub fn rejected(&mut self, message: String) {
    self.is_loading = false;
    self.is_success = false;
    self.is_error = true;
    self.message = message;
  }

  pub fn reset(&mut self) {
    *self = SliceStatus::default();
  }
}

/// Swaps `updated` in for the element with the same id. Returns whether one
/// was found.
pub(crate) fn replace_by_id<T: Identified + Clone>(items: &mut [T], updated: &T) -> bool {
  match items.iter_mut().find(|item| item.id() == updated.id()) {
    Some(slot) => {
      *slot = updated.clone();
      true
    }
    None => false,
  }
}
