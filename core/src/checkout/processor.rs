// fitbook/src/checkout/processor.rs

//! The external charge step. The backend issues an intent; a processor
//! (card form, hosted page, terminal) captures it; the backend is then told.

use crate::error::{FitbookError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Clone, PartialEq)]
pub struct ChargeRequest {
  pub intent_id: String,
  pub client_secret: String,
  pub amount: f64,
  pub booking_id: String,
}

impl fmt::Debug for ChargeRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChargeRequest")
      .field("intent_id", &self.intent_id)
      .field("amount", &self.amount)
      .field("booking_id", &self.booking_id)
      .finish_non_exhaustive()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeReceipt {
  pub intent_id: String,
  /// Processor-side status, e.g. `succeeded`.
  pub status: String,
}

/// Captures the money for an issued intent. A decline comes back as
/// [`FitbookError::Charge`] with the processor's message.
#[async_trait]
pub trait PaymentProcessor: Send + Sync + fmt::Debug {
  async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt>;
}

/// Scripted outcome for [`MockProcessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCharge {
  Succeed,
  Decline(String),
  /// Never answers; exercises the charge timeout.
  Hang,
}

/// In-process processor. Plays its script in order, then succeeds.
#[derive(Debug, Default)]
pub struct MockProcessor {
  script: Mutex<VecDeque<MockCharge>>,
  calls: Mutex<Vec<ChargeRequest>>,
  latency: Duration,
}

impl MockProcessor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn scripted(outcomes: impl IntoIterator<Item = MockCharge>) -> Self {
    Self {
      script: Mutex::new(outcomes.into_iter().collect()),
      ..Self::default()
    }
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  pub fn calls(&self) -> Vec<ChargeRequest> {
    self.calls.lock().clone()
  }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
  #[instrument(name = "MockProcessor::charge", skip_all, fields(intent_id = %request.intent_id, amount = request.amount))]
  async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt> {
    self.calls.lock().push(request.clone());
    let outcome = self.script.lock().pop_front().unwrap_or(MockCharge::Succeed);
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }

    match outcome {
      MockCharge::Succeed => {
        info!("Mock charge succeeded.");
        Ok(ChargeReceipt {
          intent_id: request.intent_id.clone(),
          status: "succeeded".to_string(),
        })
      }
      MockCharge::Decline(message) => {
        info!(%message, "Mock charge declined.");
        Err(FitbookError::Charge(message))
      }
      MockCharge::Hang => {
        std::future::pending::<()>().await;
        Err(FitbookError::Internal("unreachable mock outcome".into()))
      }
    }
  }
}
