// fitbook/src/model/booking.rs

use super::class::ClassOffering;
use super::serde_fmt::{hhmm, ymd};
use super::trainer::Trainer;
use super::user::User;
use super::{Identified, Ref};
use crate::error::{FitbookError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
  Pending,
  Confirmed,
  Cancelled,
  Completed,
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
  Client,
  Trainer,
  /// The backend reacting to a confirmed payment.
  Payment,
}

impl BookingStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      BookingStatus::Pending => "pending",
      BookingStatus::Confirmed => "confirmed",
      BookingStatus::Cancelled => "cancelled",
      BookingStatus::Completed => "completed",
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
  }

  /// The booking lifecycle:
  ///
  /// * `pending → confirmed` on payment or by the trainer
  /// * `pending | confirmed → cancelled` by the client or the trainer
  /// * `confirmed → completed` by the trainer
  ///
  /// `cancelled` and `completed` are terminal. The client-side date rule for
  /// cancellation lives in [`Booking::check_cancel`].
  pub fn can_transition(self, to: BookingStatus, actor: Actor) -> bool {
    use BookingStatus::*;
    matches!(
      (self, to, actor),
      (Pending, Confirmed, Actor::Trainer | Actor::Payment)
        | (Pending | Confirmed, Cancelled, Actor::Client | Actor::Trainer)
        | (Confirmed, Completed, Actor::Trainer)
    )
  }
}

impl fmt::Display for BookingStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for BookingStatus {
  type Err = FitbookError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "pending" => Ok(BookingStatus::Pending),
      "confirmed" => Ok(BookingStatus::Confirmed),
      "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
      "completed" => Ok(BookingStatus::Completed),
      other => Err(FitbookError::Validation(format!("Unknown booking status '{other}'"))),
    }
  }
}

/// Payment state as recorded on the booking itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  #[default]
  Pending,
  Paid,
  Refunded,
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      PaymentStatus::Pending => "pending",
      PaymentStatus::Paid => "paid",
      PaymentStatus::Refunded => "refunded",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
  #[serde(rename = "_id", alias = "id")]
  pub id: String,
  pub class: Ref<ClassOffering>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub client: Option<Ref<User>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub trainer: Option<Ref<Trainer>>,
  #[serde(with = "ymd")]
  pub date: NaiveDate,
  #[serde(with = "hhmm")]
  pub start_time: NaiveTime,
  #[serde(with = "hhmm")]
  pub end_time: NaiveTime,
  pub status: BookingStatus,
  #[serde(default)]
  pub payment_status: PaymentStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Booking {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Booking {
  pub fn class_title(&self) -> Option<&str> {
    self.class.doc().map(|c| c.title.as_str())
  }

  /// Upcoming in the booking-list sense: neither cancelled nor completed.
  pub fn is_upcoming(&self) -> bool {
    !self.status.is_terminal()
  }

  pub fn can_cancel(&self, today: NaiveDate) -> bool {
    self.check_cancel(today).is_ok()
  }

  /// Client-side cancellation guard: the booking date must be strictly after
  /// `today` and the booking must still be cancellable.
  pub fn check_cancel(&self, today: NaiveDate) -> Result<()> {
    if self.date <= today {
      return Err(FitbookError::CancellationNotAllowed(format!(
        "the class on {} has already started or passed",
        self.date
      )));
    }
    if self.status == BookingStatus::Cancelled {
      return Err(FitbookError::CancellationNotAllowed("it is already cancelled".to_string()));
    }
    self.check_transition(BookingStatus::Cancelled, Actor::Client)
  }

  pub fn check_transition(&self, to: BookingStatus, actor: Actor) -> Result<()> {
    if self.status.can_transition(to, actor) {
      Ok(())
    } else {
      Err(FitbookError::InvalidTransition { from: self.status, to })
    }
  }
}

/// Body of `POST /bookings`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
  pub class_id: String,
  #[serde(with = "ymd")]
  pub date: NaiveDate,
  #[serde(with = "hhmm")]
  pub start_time: NaiveTime,
  #[serde(with = "hhmm")]
  pub end_time: NaiveTime,
}

/// Query for the booking lists (`?status=&upcoming=`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingQuery {
  pub status: Option<BookingStatus>,
  pub upcoming: Option<bool>,
}

impl BookingQuery {
  pub fn to_pairs(&self) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Some(status) = self.status {
      pairs.push(("status".to_string(), status.to_string()));
    }
    if let Some(upcoming) = self.upcoming {
      pairs.push(("upcoming".to_string(), upcoming.to_string()));
    }
    pairs
  }
}

/// Dashboard counters; the backend decides which keys it sends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingStats(pub BTreeMap<String, Value>);

impl BookingStats {
  pub fn count(&self, key: &str) -> Option<u64> {
    self.0.get(key).and_then(Value::as_u64)
  }
}
