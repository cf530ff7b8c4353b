// fitbook/src/checkout/workflow.rs

use super::checkpoint::{CheckpointStore, FileCheckpointStore};
use super::pipeline::{build_checkout_flow, CheckoutCtx, CheckoutDeps, STEP_CHARGE, STEP_CONFIRM_PAYMENT};
use super::processor::PaymentProcessor;
use super::retry::RetryPolicy;
use super::state::{CheckoutCheckpoint, CheckoutPhase};
use crate::api::{ApiClient, RefundReceipt};
use crate::config::ClientConfig;
use crate::error::{FitbookError, Result};
use crate::flow::{ContextData, Flow, FlowOutcome};
use crate::model::{next_occurrence, Booking, ClassOffering, Payment, ScheduleSlot};
use crate::store::{Action, PaymentsAction, Store};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// What a finished run hands back.
#[derive(Debug, Clone)]
pub struct CheckoutReport {
  pub checkpoint: CheckoutCheckpoint,
  /// The booking as last read from the backend.
  pub booking: Option<Booking>,
  pub payment: Option<Payment>,
}

/// Books a class and pays for it: create booking, issue intent, charge through
/// the [`PaymentProcessor`], confirm, re-read the booking.
///
/// Progress is checkpointed after every step. At most one checkout exists at a
/// time and at most one of its steps runs at a time.
pub struct CheckoutWorkflow {
  deps: Arc<CheckoutDeps>,
  flow: Flow<CheckoutCtx, FitbookError>,
  running: Mutex<()>,
}

impl std::fmt::Debug for CheckoutWorkflow {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CheckoutWorkflow")
      .field("flow", &self.flow.name())
      .field("retry", &self.deps.retry)
      .finish_non_exhaustive()
  }
}

/// Assembles a [`CheckoutWorkflow`].
pub struct CheckoutBuilder {
  client: ApiClient,
  processor: Arc<dyn PaymentProcessor>,
  checkpoints: Option<Arc<dyn CheckpointStore>>,
  retry: RetryPolicy,
  charge_timeout: Duration,
  store: Option<Store>,
}

impl CheckoutBuilder {
  pub fn new(client: ApiClient, processor: Arc<dyn PaymentProcessor>) -> Self {
    Self {
      client,
      processor,
      checkpoints: None,
      retry: RetryPolicy::default(),
      charge_timeout: Duration::from_secs(60),
      store: None,
    }
  }

  /// Takes retry, timeout and checkpoint location from `config`.
  pub fn configured(mut self, config: &ClientConfig) -> Self {
    self.retry = RetryPolicy::from_config(config);
    self.charge_timeout = config.charge_timeout;
    self.checkpoints = Some(Arc::new(FileCheckpointStore::new(config.checkout_file.clone())));
    self
  }

  pub fn checkpoints(mut self, store: Arc<dyn CheckpointStore>) -> Self {
    self.checkpoints = Some(store);
    self
  }

  pub fn retry(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  pub fn charge_timeout(mut self, timeout: Duration) -> Self {
    self.charge_timeout = timeout;
    self
  }

  /// Mirrors checkout progress into the bookings and payments slices.
  pub fn store(mut self, store: Store) -> Self {
    self.store = Some(store);
    self
  }

  pub fn build(self) -> Result<CheckoutWorkflow> {
    let checkpoints = self
      .checkpoints
      .ok_or_else(|| FitbookError::Config("checkout needs a checkpoint store".into()))?;
    let deps = Arc::new(CheckoutDeps {
      client: self.client,
      processor: self.processor,
      checkpoints,
      retry: self.retry,
      charge_timeout: self.charge_timeout,
      store: self.store,
    });
    let flow = build_checkout_flow(deps.clone())?;
    Ok(CheckoutWorkflow {
      deps,
      flow,
      running: Mutex::new(()),
    })
  }
}

impl CheckoutWorkflow {
  pub fn builder(client: ApiClient, processor: Arc<dyn PaymentProcessor>) -> CheckoutBuilder {
    CheckoutBuilder::new(client, processor)
  }

  /// Starts a checkout for `slot` of `class`, dated at the slot's next
  /// occurrence after `today`. Refused while an unfinished checkout exists.
  #[instrument(name = "CheckoutWorkflow::start", skip_all, fields(class_id = %class.id, slot = %slot))]
  pub async fn start(&self, class: &ClassOffering, slot: ScheduleSlot, today: NaiveDate) -> Result<CheckoutReport> {
    let _running = self.lock()?;
    if let Some(existing) = self.deps.checkpoints.load().await? {
      // Nothing reached the backend from an idle checkout.
      if !existing.phase.is_finished() && existing.phase != CheckoutPhase::Idle {
        return Err(FitbookError::Validation(format!(
          "A checkout for {} is still {}; resume or abort it first",
          existing.class_title, existing.phase
        )));
      }
    }

    let checkpoint = CheckoutCheckpoint::new(
      class.id.clone(),
      class.title.clone(),
      slot,
      next_occurrence(slot.day, today),
      class.price,
    );
    let ctx = ContextData::new(CheckoutCtx {
      checkpoint,
      class: Some(class.clone()),
      today,
      booking: None,
      payment: None,
    });
    self.drive(None, ctx).await
  }

  /// Continues a stored checkout from the step it had not finished.
  pub async fn resume(&self, today: NaiveDate) -> Result<CheckoutReport> {
    let _running = self.lock()?;
    let checkpoint = self.load_active().await?;
    let step = checkpoint.phase.resume_step().ok_or(FitbookError::NoCheckoutInProgress)?;
    info!(phase = %checkpoint.phase, step, "Resuming checkout.");
    self.drive(Some(step), Self::resumed_ctx(checkpoint, today)).await
  }

  /// Charges the same intent again after a failed charge.
  pub async fn retry_charge(&self, today: NaiveDate) -> Result<CheckoutReport> {
    let _running = self.lock()?;
    let checkpoint = self.load_active().await?;
    if !matches!(checkpoint.phase, CheckoutPhase::IntentIssued { .. }) {
      return Err(FitbookError::Validation(format!(
        "There is no failed charge to retry (checkout is {})",
        checkpoint.phase
      )));
    }
    self.drive(Some(STEP_CHARGE), Self::resumed_ctx(checkpoint, today)).await
  }

  /// Asks the backend once more to acknowledge a captured charge. Only a
  /// checkout whose charge went through qualifies, including one abandoned
  /// while its capture was unconfirmed. An intent the backend already
  /// acknowledged is refused.
  pub async fn retry_confirmation(&self, today: NaiveDate) -> Result<CheckoutReport> {
    let _running = self.lock()?;
    let checkpoint = self
      .deps
      .checkpoints
      .load()
      .await?
      .ok_or(FitbookError::NoCheckoutInProgress)?;
    let captured = checkpoint.phase.captured_intent().is_some();
    if !captured && !matches!(checkpoint.phase, CheckoutPhase::Confirmed { .. }) {
      return Err(FitbookError::Validation(format!(
        "The payment has not been captured (checkout is {})",
        checkpoint.phase
      )));
    }
    if let CheckoutPhase::Aborted { captured_intent: Some(intent_id), .. } = &checkpoint.phase {
      warn!(%intent_id, "Confirming a payment from an abandoned checkout.");
    }
    self
      .drive(Some(STEP_CONFIRM_PAYMENT), Self::resumed_ctx(checkpoint, today))
      .await
  }

  /// Gives up on the stored checkout. A pending booking that was never paid
  /// is cancelled; a captured charge is only ever resumed, not abandoned,
  /// unless confirmation already failed for good.
  pub async fn abort(&self, today: NaiveDate, reason: &str) -> Result<CheckoutCheckpoint> {
    let _running = self.lock()?;
    let mut checkpoint = self.load_active().await?;

    let mut captured_intent = None;
    match &checkpoint.phase {
      CheckoutPhase::Charged { .. } => {
        return Err(FitbookError::Validation(
          "The payment was already captured; resume the checkout to confirm it".into(),
        ));
      }
      CheckoutPhase::CaptureUnconfirmed { intent_id } => {
        warn!(%intent_id, "Abandoning a captured but unconfirmed payment.");
        captured_intent = Some(intent_id.clone());
      }
      CheckoutPhase::BookingCreated { .. } | CheckoutPhase::IntentIssued { .. } => {
        if let Some(booking_id) = checkpoint.booking_id.as_deref() {
          if checkpoint.date > today {
            match self.deps.client.cancel_booking(booking_id).await {
              Ok(booking) => info!(booking_id = %booking.id, "Unpaid booking cancelled."),
              Err(err) => warn!(%booking_id, error = %err, "Could not cancel unpaid booking."),
            }
          }
        }
        self.dispatch(Action::Payments(PaymentsAction::ClearIntent));
      }
      _ => {}
    }

    checkpoint.advance(CheckoutPhase::Aborted {
      reason: reason.to_string(),
      captured_intent,
    });
    self.deps.checkpoints.save(&checkpoint).await?;
    Ok(checkpoint)
  }

  /// The stored checkout, finished or not.
  pub async fn status(&self) -> Result<Option<CheckoutCheckpoint>> {
    self.deps.checkpoints.load().await
  }

  /// Drops the stored checkout once it is finished, or while it is still idle.
  pub async fn clear(&self) -> Result<()> {
    if let Some(existing) = self.deps.checkpoints.load().await? {
      if !existing.phase.is_finished() && existing.phase != CheckoutPhase::Idle {
        return Err(FitbookError::Validation(format!("Checkout is still {}", existing.phase)));
      }
    }
    self.deps.checkpoints.clear().await
  }

  /// Refunds a completed payment. The booking's status is not touched.
  #[instrument(name = "CheckoutWorkflow::refund", skip(self))]
  pub async fn refund(&self, payment_id: &str, reason: Option<&str>) -> Result<RefundReceipt> {
    let payment = self.deps.client.payment_details(payment_id).await?;
    if !payment.can_refund() {
      return Err(FitbookError::Validation(format!(
        "Only completed payments can be refunded (this one is {})",
        payment.status
      )));
    }
    let receipt = self.deps.client.refund_payment(payment_id, reason).await?;
    info!(payment_id, "Payment refunded.");
    self.dispatch(Action::Payments(PaymentsAction::Refunded {
      payment_id: receipt.payment_id.clone(),
    }));
    Ok(receipt)
  }

  fn lock(&self) -> Result<tokio::sync::MutexGuard<'_, ()>> {
    self
      .running
      .try_lock()
      .map_err(|_| FitbookError::Validation("A checkout step is already running".into()))
  }

  async fn load_active(&self) -> Result<CheckoutCheckpoint> {
    match self.deps.checkpoints.load().await? {
      Some(cp) if !cp.phase.is_finished() => Ok(cp),
      _ => Err(FitbookError::NoCheckoutInProgress),
    }
  }

  fn resumed_ctx(checkpoint: CheckoutCheckpoint, today: NaiveDate) -> ContextData<CheckoutCtx> {
    ContextData::new(CheckoutCtx {
      checkpoint,
      class: None,
      today,
      booking: None,
      payment: None,
    })
  }

  async fn drive(&self, from: Option<&str>, ctx: ContextData<CheckoutCtx>) -> Result<CheckoutReport> {
    let outcome = match from {
      Some(step) => self.flow.run_from(step, ctx.clone()).await?,
      None => self.flow.run(ctx.clone()).await?,
    };
    if outcome == FlowOutcome::Stopped {
      warn!("Checkout flow stopped early.");
    }
    let c = ctx.snapshot();
    Ok(CheckoutReport {
      checkpoint: c.checkpoint,
      booking: c.booking,
      payment: c.payment,
    })
  }

  fn dispatch(&self, action: Action) {
    if let Some(store) = &self.deps.store {
      store.dispatch(action);
    }
  }
}
