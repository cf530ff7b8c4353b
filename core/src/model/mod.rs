// fitbook/src/model/mod.rs

//! Wire types for the booking backend. Field names follow the backend's JSON
//! (`_id`, camelCase); documents that the backend may or may not populate are
//! held as [`Ref`].

pub mod booking;
pub mod class;
pub mod payment;
pub mod serde_fmt;
pub mod trainer;
pub mod user;

pub use booking::{Actor, Booking, BookingQuery, BookingStats, BookingStatus, NewBooking, PaymentStatus};
pub use class::{next_occurrence, upcoming_dates, ClassDraft, ClassFilters, ClassOffering, Day, ScheduleSlot};
pub use payment::{Payment, PaymentIntent, PaymentRecordStatus};
pub use trainer::{Review, ReviewDraft, Trainer, TrainerFilters, TrainerProfile};
pub use user::{Profile, ProfileUpdate, Registration, Role, User};

use serde::{Deserialize, Serialize};

/// Documents that expose their backend id.
pub trait Identified {
  fn id(&self) -> &str;
}

/// A reference the backend sends either as a bare id or as the populated
/// document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
  Id(String),
  Doc(Box<T>),
}

impl<T: Identified> Ref<T> {
  pub fn id(&self) -> &str {
    match self {
      Ref::Id(id) => id,
      Ref::Doc(doc) => doc.id(),
    }
  }

  pub fn doc(&self) -> Option<&T> {
    match self {
      Ref::Id(_) => None,
      Ref::Doc(doc) => Some(doc),
    }
  }
}
