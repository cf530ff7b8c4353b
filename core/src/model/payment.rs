// fitbook/src/model/payment.rs

use super::booking::Booking;
use super::{Identified, Ref};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a payment record on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentRecordStatus {
  Pending,
  Completed,
  Refunded,
  Failed,
}

impl fmt::Display for PaymentRecordStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      PaymentRecordStatus::Pending => "pending",
      PaymentRecordStatus::Completed => "completed",
      PaymentRecordStatus::Refunded => "refunded",
      PaymentRecordStatus::Failed => "failed",
    };
    f.write_str(label)
  }
}

impl std::str::FromStr for PaymentRecordStatus {
  type Err = crate::error::FitbookError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase()))
      .map_err(|_| crate::error::FitbookError::Validation(format!("Unknown payment status '{s}'")))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
  #[serde(rename = "_id", alias = "id")]
  pub id: String,
  pub amount: f64,
  pub status: PaymentRecordStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub booking: Option<Ref<Booking>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub payment_method: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub transaction_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub receipt_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Payment {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Payment {
  /// Only captured payments can be refunded.
  pub fn can_refund(&self) -> bool {
    self.status == PaymentRecordStatus::Completed
  }

  pub fn booking_id(&self) -> Option<&str> {
    self.booking.as_ref().map(Ref::id)
  }
}

/// Short-lived handle for a charge that has been authorized but not yet
/// captured. Consumed once by the confirmation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIntent")]
pub struct PaymentIntent {
  pub id: String,
  #[serde(rename = "clientSecret")]
  pub client_secret: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub amount: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIntent {
  #[serde(alias = "paymentIntentId", alias = "_id")]
  id: Option<String>,
  client_secret: String,
  #[serde(default)]
  amount: Option<f64>,
}

impl TryFrom<RawIntent> for PaymentIntent {
  type Error = String;

  /// Processors of the `pi_…_secret_…` family embed the intent id in the
  /// client secret; the backend sometimes only returns the secret.
  fn try_from(raw: RawIntent) -> Result<Self, Self::Error> {
    let id = match raw.id {
      Some(id) => id,
      None => raw
        .client_secret
        .split_once("_secret_")
        .map(|(id, _)| id.to_string())
        .ok_or_else(|| "payment intent response carries no intent id".to_string())?,
    };
    Ok(PaymentIntent {
      id,
      client_secret: raw.client_secret,
      amount: raw.amount,
    })
  }
}

// Secrets stay out of logs and debug dumps of the checkout state.
impl PaymentIntent {
  pub fn redacted_secret(&self) -> String {
    let visible: String = self.client_secret.chars().take(6).collect();
    format!("{visible}…")
  }
}
