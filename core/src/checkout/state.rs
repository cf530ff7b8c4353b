// fitbook/src/checkout/state.rs

use crate::model::{PaymentIntent, ScheduleSlot};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Where a checkout stands. The happy path is
/// `Idle → BookingCreated → IntentIssued → Charged → Confirmed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CheckoutPhase {
  Idle,
  BookingCreated {
    booking_id: String,
  },
  IntentIssued {
    intent_id: String,
  },
  /// The processor captured the money; the backend has not been told yet.
  Charged {
    intent_id: String,
  },
  Confirmed {
    payment_id: String,
  },
  Aborted {
    reason: String,
    /// Set when the abandoned checkout had a captured but unconfirmed charge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    captured_intent: Option<String>,
  },
  /// Money captured, every confirmation attempt failed. Needs a human.
  CaptureUnconfirmed {
    intent_id: String,
  },
}

impl CheckoutPhase {
  pub fn label(&self) -> &'static str {
    match self {
      CheckoutPhase::Idle => "idle",
      CheckoutPhase::BookingCreated { .. } => "booking_created",
      CheckoutPhase::IntentIssued { .. } => "intent_issued",
      CheckoutPhase::Charged { .. } => "charged",
      CheckoutPhase::Confirmed { .. } => "confirmed",
      CheckoutPhase::Aborted { .. } => "aborted",
      CheckoutPhase::CaptureUnconfirmed { .. } => "capture_unconfirmed",
    }
  }

  /// A finished checkout may be replaced by a new one.
  pub fn is_finished(&self) -> bool {
    matches!(self, CheckoutPhase::Confirmed { .. } | CheckoutPhase::Aborted { .. })
  }

  /// The intent the processor has captured money for, if any.
  pub fn captured_intent(&self) -> Option<&str> {
    match self {
      CheckoutPhase::Charged { intent_id } | CheckoutPhase::CaptureUnconfirmed { intent_id } => Some(intent_id),
      CheckoutPhase::Aborted { captured_intent, .. } => captured_intent.as_deref(),
      _ => None,
    }
  }

  /// The workflow step a resumed checkout restarts from; `None` once there is
  /// nothing left to run.
  pub fn resume_step(&self) -> Option<&'static str> {
    match self {
      CheckoutPhase::Idle => Some(super::pipeline::STEP_VALIDATE_SLOT),
      CheckoutPhase::BookingCreated { .. } => Some(super::pipeline::STEP_CREATE_INTENT),
      CheckoutPhase::IntentIssued { .. } => Some(super::pipeline::STEP_CHARGE),
      CheckoutPhase::Charged { .. } | CheckoutPhase::CaptureUnconfirmed { .. } => {
        Some(super::pipeline::STEP_CONFIRM_PAYMENT)
      }
      CheckoutPhase::Confirmed { .. } => Some(super::pipeline::STEP_REFRESH_BOOKING),
      CheckoutPhase::Aborted { .. } => None,
    }
  }
}

impl fmt::Display for CheckoutPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Everything needed to pick a checkout back up after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCheckpoint {
  pub id: Uuid,
  pub class_id: String,
  pub class_title: String,
  pub slot: ScheduleSlot,
  pub date: NaiveDate,
  /// Class price at the time of booking. Not editable.
  pub amount: f64,
  #[serde(default)]
  pub booking_id: Option<String>,
  #[serde(default)]
  pub intent: Option<PaymentIntent>,
  #[serde(default)]
  pub payment_id: Option<String>,
  pub phase: CheckoutPhase,
  #[serde(default)]
  pub charge_attempts: u32,
  #[serde(default)]
  pub last_error: Option<String>,
  /// Intents the backend has acknowledged. Each is confirmed at most once.
  #[serde(default)]
  pub confirmed_intents: BTreeSet<String>,
  pub updated_at: DateTime<Utc>,
}

impl CheckoutCheckpoint {
  pub fn new(class_id: impl Into<String>, class_title: impl Into<String>, slot: ScheduleSlot, date: NaiveDate, amount: f64) -> Self {
    Self {
      id: Uuid::new_v4(),
      class_id: class_id.into(),
      class_title: class_title.into(),
      slot,
      date,
      amount,
      booking_id: None,
      intent: None,
      payment_id: None,
      phase: CheckoutPhase::Idle,
      charge_attempts: 0,
      last_error: None,
      confirmed_intents: BTreeSet::new(),
      updated_at: Utc::now(),
    }
  }

  pub fn intent_id(&self) -> Option<&str> {
    self.intent.as_ref().map(|i| i.id.as_str())
  }

  pub(crate) fn advance(&mut self, phase: CheckoutPhase) {
    self.phase = phase;
    self.last_error = None;
    self.updated_at = Utc::now();
  }

  pub(crate) fn record_error(&mut self, message: impl Into<String>) {
    self.last_error = Some(message.into());
    self.updated_at = Utc::now();
  }
}
