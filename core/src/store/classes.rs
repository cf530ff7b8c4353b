// fitbook/src/store/classes.rs

use super::status::{replace_by_id, SliceStatus};
use crate::model::ClassOffering;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassesState {
  pub classes: Vec<ClassOffering>,
  pub current: Option<ClassOffering>,
  pub recommended: Vec<ClassOffering>,
  pub status: SliceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassesAction {
  Pending,
  Listed(Vec<ClassOffering>),
  Loaded(ClassOffering),
  Created(ClassOffering),
  Updated(ClassOffering),
  Deleted(String),
  Recommended(Vec<ClassOffering>),
  Rejected(String),
  ClearCurrent,
  Clear,
  Reset,
}

impl ClassesState {
  pub fn reduce(&mut self, action: ClassesAction) {
    match action {
      ClassesAction::Pending => self.status.pending(),
      ClassesAction::Listed(classes) => {
        self.classes = classes;
        self.status.fulfilled();
      }
      ClassesAction::Loaded(class) => {
        self.current = Some(class);
        self.status.fulfilled();
      }
      ClassesAction::Created(class) => {
        self.classes.insert(0, class);
        self.status.fulfilled();
      }
      ClassesAction::Updated(class) => {
        replace_by_id(&mut self.classes, &class);
        if self.current.as_ref().is_some_and(|c| c.id == class.id) {
          self.current = Some(class);
        }
        self.status.fulfilled();
      }
      ClassesAction::Deleted(class_id) => {
        self.classes.retain(|c| c.id != class_id);
        if self.current.as_ref().is_some_and(|c| c.id == class_id) {
          self.current = None;
        }
        self.status.fulfilled();
      }
      ClassesAction::Recommended(classes) => {
        self.recommended = classes;
        self.status.fulfilled();
      }
      ClassesAction::Rejected(message) => self.status.rejected(message),
      ClassesAction::ClearCurrent => self.current = None,
      ClassesAction::Clear => self.classes.clear(),
      ClassesAction::Reset => self.status.reset(),
    }
  }
}
