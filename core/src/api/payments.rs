// fitbook/src/api/payments.rs

use super::client::{decode, unwrap_field, ApiClient};
use super::transport::ApiRequest;
use super::DEFAULT_REFUND_REASON;
use crate::error::Result;
use crate::model::{Payment, PaymentIntent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Outcome of `POST /payments/refund`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundReceipt {
  pub payment_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub refund_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl ApiClient {
  /// Asks the backend for an intent covering the booking's price.
  pub async fn create_payment_intent(&self, booking_id: &str) -> Result<PaymentIntent> {
    self
      .post(
        "payments/create-intent",
        &json!({ "bookingId": booking_id, "paymentMethod": "card" }),
      )
      .await
  }

  /// Tells the backend the processor captured the charge. The backend marks
  /// the booking paid and confirmed.
  pub async fn confirm_payment(&self, payment_intent_id: &str) -> Result<Payment> {
    let body = self
      .send(ApiRequest::post(
        "payments/confirm",
        json!({ "paymentIntentId": payment_intent_id }),
      ))
      .await?;
    decode(unwrap_field(body, "payment"))
  }

  pub async fn refund_payment(&self, payment_id: &str, reason: Option<&str>) -> Result<RefundReceipt> {
    let reason = reason.filter(|r| !r.trim().is_empty()).unwrap_or(DEFAULT_REFUND_REASON);
    let body: Value = self
      .post("payments/refund", &json!({ "paymentId": payment_id, "reason": reason }))
      .await?;
    Ok(RefundReceipt {
      payment_id: body
        .get("paymentId")
        .and_then(Value::as_str)
        .unwrap_or(payment_id)
        .to_string(),
      refund_id: body.get("refundId").and_then(Value::as_str).map(str::to_owned),
      message: super::client::ack_message(&body),
    })
  }

  pub async fn payment_history(&self) -> Result<Vec<Payment>> {
    self.get("payments/history", Vec::new()).await
  }

  pub async fn payment_details(&self, payment_id: &str) -> Result<Payment> {
    self.get(format!("payments/{}", payment_id), Vec::new()).await
  }
}
