// fitbook/src/checkout/pipeline.rs

//! The checkout as a [`Flow`]: one step per external effect, the checkpoint
//! written after each of them.

use super::checkpoint::CheckpointStore;
use super::processor::{ChargeRequest, PaymentProcessor};
use super::retry::RetryPolicy;
use super::state::{CheckoutCheckpoint, CheckoutPhase};
use crate::api::ApiClient;
use crate::error::{FitbookError, Result};
use crate::flow::{ContextData, Flow, StepControl, StepDef};
use crate::model::{next_occurrence, Booking, BookingStatus, ClassOffering, NewBooking, Payment, PaymentStatus};
use crate::store::{Action, BookingsAction, PaymentsAction, Store};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub(crate) const STEP_VALIDATE_SLOT: &str = "validate_slot";
pub(crate) const STEP_CREATE_BOOKING: &str = "create_booking";
pub(crate) const STEP_CREATE_INTENT: &str = "create_payment_intent";
pub(crate) const STEP_CHARGE: &str = "charge";
pub(crate) const STEP_CONFIRM_PAYMENT: &str = "confirm_payment";
pub(crate) const STEP_REFRESH_BOOKING: &str = "refresh_booking";

/// Context shared by the checkout steps.
#[derive(Debug, Clone)]
pub(crate) struct CheckoutCtx {
  pub checkpoint: CheckoutCheckpoint,
  /// Only present on a fresh start.
  pub class: Option<ClassOffering>,
  pub today: NaiveDate,
  pub booking: Option<Booking>,
  pub payment: Option<Payment>,
}

/// What the steps reach out to.
#[derive(Debug)]
pub(crate) struct CheckoutDeps {
  pub client: ApiClient,
  pub processor: Arc<dyn PaymentProcessor>,
  pub checkpoints: Arc<dyn CheckpointStore>,
  pub retry: RetryPolicy,
  pub charge_timeout: Duration,
  pub store: Option<Store>,
}

impl CheckoutDeps {
  async fn persist(&self, ctx: &ContextData<CheckoutCtx>) -> Result<()> {
    let checkpoint = ctx.read().checkpoint.clone();
    self.checkpoints.save(&checkpoint).await
  }

  fn dispatch(&self, action: Action) {
    if let Some(store) = &self.store {
      store.dispatch(action);
    }
  }
}

pub(crate) fn build_checkout_flow(deps: Arc<CheckoutDeps>) -> Result<Flow<CheckoutCtx, FitbookError>> {
  let mut flow = Flow::<CheckoutCtx, FitbookError>::new(
    "checkout",
    vec![
      // A resumed checkout has no class document and trusts its checkpoint.
      StepDef::required(STEP_VALIDATE_SLOT).skip_if(|ctx: ContextData<CheckoutCtx>| ctx.read().class.is_none()),
      StepDef::required(STEP_CREATE_BOOKING),
      StepDef::required(STEP_CREATE_INTENT),
      StepDef::required(STEP_CHARGE),
      StepDef::required(STEP_CONFIRM_PAYMENT),
      StepDef::optional(STEP_REFRESH_BOOKING),
    ],
  )?;

  let d = deps.clone();
  flow.on(STEP_VALIDATE_SLOT, move |ctx| validate_slot(d.clone(), ctx))?;
  let d = deps.clone();
  flow.on(STEP_CREATE_BOOKING, move |ctx| create_booking(d.clone(), ctx))?;
  let d = deps.clone();
  flow.on(STEP_CREATE_INTENT, move |ctx| create_payment_intent(d.clone(), ctx))?;
  let d = deps.clone();
  flow.on(STEP_CHARGE, move |ctx| charge(d.clone(), ctx))?;
  let d = deps.clone();
  flow.on(STEP_CONFIRM_PAYMENT, move |ctx| confirm_payment(d.clone(), ctx))?;
  let d = deps;
  flow.on(STEP_REFRESH_BOOKING, move |ctx| refresh_booking(d.clone(), ctx))?;

  Ok(flow)
}

/// The slot must be one the class publishes; the class date is the slot's next
/// occurrence and the amount is the class price.
async fn validate_slot(deps: Arc<CheckoutDeps>, ctx: ContextData<CheckoutCtx>) -> Result<StepControl> {
  deps.client.session().require_user()?;
  ctx.update(|c| -> Result<()> {
    let class = c.class.as_ref().ok_or_else(|| missing("class"))?;
    if !class.is_active {
      return Err(FitbookError::Validation("This class is not currently available".into()));
    }
    let slot = c.checkpoint.slot;
    slot.validate()?;
    if class.find_slot(&slot).is_none() {
      return Err(FitbookError::Validation(format!("{} is not on the schedule of this class", slot)));
    }
    c.checkpoint.date = next_occurrence(slot.day, c.today);
    c.checkpoint.amount = class.price;
    Ok(())
  })?;
  // Persisted from create_booking on; a rejected booking leaves nothing behind.
  Ok(StepControl::Continue)
}

async fn create_booking(deps: Arc<CheckoutDeps>, ctx: ContextData<CheckoutCtx>) -> Result<StepControl> {
  let body = {
    let c = ctx.read();
    NewBooking {
      class_id: c.checkpoint.class_id.clone(),
      date: c.checkpoint.date,
      start_time: c.checkpoint.slot.start_time,
      end_time: c.checkpoint.slot.end_time,
    }
  };

  let booking = deps.client.create_booking(&body).await?;
  info!(booking_id = %booking.id, date = %booking.date, "Booking created.");

  ctx.update(|c| {
    c.checkpoint.booking_id = Some(booking.id.clone());
    c.checkpoint.advance(CheckoutPhase::BookingCreated {
      booking_id: booking.id.clone(),
    });
    c.booking = Some(booking.clone());
  });
  deps.persist(&ctx).await?;
  deps.dispatch(Action::Bookings(BookingsAction::Created(booking)));
  Ok(StepControl::Continue)
}

async fn create_payment_intent(deps: Arc<CheckoutDeps>, ctx: ContextData<CheckoutCtx>) -> Result<StepControl> {
  let booking_id = booking_id(&ctx)?;
  let intent = deps.client.create_payment_intent(&booking_id).await?;
  info!(intent_id = %intent.id, secret = %intent.redacted_secret(), "Payment intent issued.");

  ctx.update(|c| {
    c.checkpoint.intent = Some(intent.clone());
    c.checkpoint.charge_attempts = 0;
    c.checkpoint.advance(CheckoutPhase::IntentIssued {
      intent_id: intent.id.clone(),
    });
  });
  deps.persist(&ctx).await?;
  deps.dispatch(Action::Payments(PaymentsAction::IntentCreated(intent)));
  Ok(StepControl::Continue)
}

/// Hands the intent to the processor, bounded by the charge timeout. A failed
/// charge leaves the checkout at `IntentIssued` with the same intent.
async fn charge(deps: Arc<CheckoutDeps>, ctx: ContextData<CheckoutCtx>) -> Result<StepControl> {
  let request = {
    let c = ctx.read();
    let intent = c.checkpoint.intent.clone().ok_or_else(|| missing("payment intent"))?;
    ChargeRequest {
      intent_id: intent.id,
      client_secret: intent.client_secret,
      amount: c.checkpoint.amount,
      booking_id: c.checkpoint.booking_id.clone().ok_or_else(|| missing("booking id"))?,
    }
  };
  ctx.update(|c| c.checkpoint.charge_attempts += 1);

  let outcome = match tokio::time::timeout(deps.charge_timeout, deps.processor.charge(&request)).await {
    Ok(result) => result,
    Err(_) => Err(FitbookError::Charge(format!(
      "The payment processor did not answer within {}s",
      deps.charge_timeout.as_secs()
    ))),
  };

  match outcome {
    Ok(receipt) => {
      info!(intent_id = %receipt.intent_id, status = %receipt.status, "Charge captured.");
      ctx.update(|c| {
        c.checkpoint.advance(CheckoutPhase::Charged {
          intent_id: request.intent_id.clone(),
        })
      });
      deps.persist(&ctx).await?;
      Ok(StepControl::Continue)
    }
    Err(err) => {
      warn!(intent_id = %request.intent_id, error = %err, "Charge failed.");
      ctx.update(|c| c.checkpoint.record_error(err.user_message()));
      deps.persist(&ctx).await?;
      Err(err)
    }
  }
}

/// Tells the backend the charge went through. Retried with backoff; when every
/// attempt fails the checkout is parked at `CaptureUnconfirmed`.
async fn confirm_payment(deps: Arc<CheckoutDeps>, ctx: ContextData<CheckoutCtx>) -> Result<StepControl> {
  let intent_id = {
    let c = ctx.read();
    let intent_id = c.checkpoint.intent_id().ok_or_else(|| missing("payment intent"))?.to_string();
    if c.checkpoint.confirmed_intents.contains(&intent_id) {
      return Err(FitbookError::DuplicateConfirmation { intent_id });
    }
    intent_id
  };

  let mut attempt = 0;
  let last_error = loop {
    attempt += 1;
    match deps.client.confirm_payment(&intent_id).await {
      Ok(payment) => {
        info!(%intent_id, payment_id = %payment.id, attempt, "Payment confirmed.");
        ctx.update(|c| {
          c.checkpoint.confirmed_intents.insert(intent_id.clone());
          c.checkpoint.payment_id = Some(payment.id.clone());
          c.checkpoint.advance(CheckoutPhase::Confirmed {
            payment_id: payment.id.clone(),
          });
          c.payment = Some(payment.clone());
        });
        deps.persist(&ctx).await?;
        deps.dispatch(Action::Payments(PaymentsAction::Confirmed(payment)));
        return Ok(StepControl::Continue);
      }
      Err(err) => {
        warn!(%intent_id, attempt, error = %err, "Payment confirmation failed.");
        // Without a session there is nobody to confirm as.
        if err.is_unauthorized() {
          break err;
        }
        match deps.retry.delay_after(attempt) {
          Some(delay) => tokio::time::sleep(delay).await,
          None => break err,
        }
      }
    }
  };

  let last_error = last_error.user_message();
  ctx.update(|c| {
    c.checkpoint.advance(CheckoutPhase::CaptureUnconfirmed {
      intent_id: intent_id.clone(),
    });
    c.checkpoint.record_error(last_error.clone());
  });
  deps.persist(&ctx).await?;
  Err(FitbookError::PaymentCapturedUnconfirmed { intent_id, last_error })
}

/// Re-reads the booking so the caller sees the backend's view. The payment is
/// already confirmed; a failed read is reported but does not fail the checkout.
async fn refresh_booking(deps: Arc<CheckoutDeps>, ctx: ContextData<CheckoutCtx>) -> Result<StepControl> {
  let booking_id = booking_id(&ctx)?;
  match deps.client.get_booking(&booking_id).await {
    Ok(booking) => {
      if booking.payment_status != PaymentStatus::Paid || booking.status != BookingStatus::Confirmed {
        warn!(
          %booking_id,
          status = %booking.status,
          payment_status = ?booking.payment_status,
          "Booking not yet marked paid and confirmed."
        );
      }
      ctx.update(|c| c.booking = Some(booking.clone()));
      deps.dispatch(Action::Bookings(BookingsAction::Loaded(booking)));
    }
    Err(err) => warn!(%booking_id, error = %err, "Could not refresh booking after payment."),
  }
  Ok(StepControl::Continue)
}

fn booking_id(ctx: &ContextData<CheckoutCtx>) -> Result<String> {
  ctx
    .read()
    .checkpoint
    .booking_id
    .clone()
    .ok_or_else(|| missing("booking id"))
}

fn missing(what: &str) -> FitbookError {
  FitbookError::Internal(format!("checkout checkpoint has no {}", what))
}
