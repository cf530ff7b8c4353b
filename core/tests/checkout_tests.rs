// tests/checkout_tests.rs

mod common;

use common::*;
use fitbook::api::Method;
use fitbook::checkout::{
  CheckoutCheckpoint, CheckpointStore, CheckoutPhase, CheckoutWorkflow, FileCheckpointStore, MemoryCheckpointStore, MockCharge,
  MockProcessor, RetryPolicy,
};
use fitbook::error::FitbookError;
use fitbook::model::{BookingStatus, Day, PaymentStatus, Role, ScheduleSlot};
use fitbook::session::SessionContext;
use fitbook::store::Store;
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
  transport: Arc<FakeTransport>,
  processor: Arc<MockProcessor>,
  checkpoints: Arc<dyn CheckpointStore>,
  session: SessionContext,
  store: Store,
  workflow: CheckoutWorkflow,
}

async fn harness(transport: Arc<FakeTransport>, processor: MockProcessor, checkpoints: Arc<dyn CheckpointStore>) -> Harness {
  let (client, session) = signed_in(transport.clone(), Role::Client).await;
  let processor = Arc::new(processor);
  let store = Store::new();
  let workflow = CheckoutWorkflow::builder(client, processor.clone())
    .checkpoints(checkpoints.clone())
    .retry(RetryPolicy::new(3, Duration::from_millis(1)))
    .charge_timeout(Duration::from_millis(50))
    .store(store.clone())
    .build()
    .unwrap();
  Harness {
    transport,
    processor,
    checkpoints,
    session,
    store,
    workflow,
  }
}

fn script_booking_and_intent(transport: &FakeTransport) {
  transport.respond(
    Method::Post,
    "bookings",
    201,
    booking_json("b-1", "pending", "pending", "2026-10-19"),
  );
  transport.respond(
    Method::Post,
    "payments/create-intent",
    200,
    json!({"clientSecret": "pi_1_secret_abc", "paymentIntentId": "pi_1", "amount": 40}),
  );
}

fn script_confirmation(transport: &FakeTransport) {
  transport.respond(
    Method::Post,
    "payments/confirm",
    200,
    json!({"payment": payment_json("pay-1", "completed", "b-1")}),
  );
}

fn script_refetch(transport: &FakeTransport) {
  transport.respond(
    Method::Get,
    "bookings/b-1",
    200,
    booking_json("b-1", "confirmed", "paid", "2026-10-19"),
  );
}

fn script_happy_backend(transport: &FakeTransport) {
  script_booking_and_intent(transport);
  script_confirmation(transport);
  script_refetch(transport);
}

#[tokio::test]
#[serial]
async fn test_booking_a_monday_class_end_to_end() {
  setup_tracing();
  let transport = FakeTransport::new();
  script_happy_backend(&transport);
  let h = harness(transport, MockProcessor::new(), Arc::new(MemoryCheckpointStore::new())).await;

  let report = h.workflow.start(&yoga_class(), monday_slot(), today()).await.unwrap();

  let booking_post = &h.transport.requests_to(Method::Post, "bookings")[0];
  assert_eq!(
    booking_post.body.as_ref().unwrap(),
    &json!({"classId": "class-yoga", "date": "2026-10-19", "startTime": "09:00", "endTime": "10:00"})
  );
  let intent_post = &h.transport.requests_to(Method::Post, "payments/create-intent")[0];
  assert_eq!(intent_post.body.as_ref().unwrap()["bookingId"], "b-1");

  let charges = h.processor.calls();
  assert_eq!(charges.len(), 1);
  assert_eq!(charges[0].intent_id, "pi_1");
  assert_eq!(charges[0].amount, 40.0);

  let confirm = &h.transport.requests_to(Method::Post, "payments/confirm")[0];
  assert_eq!(confirm.body.as_ref().unwrap()["paymentIntentId"], "pi_1");

  assert_eq!(
    report.checkpoint.phase,
    CheckoutPhase::Confirmed {
      payment_id: "pay-1".into()
    }
  );
  assert_eq!(report.checkpoint.date, next_monday());
  let booking = report.booking.unwrap();
  assert_eq!(booking.status, BookingStatus::Confirmed);
  assert_eq!(booking.payment_status, PaymentStatus::Paid);

  let state = h.store.snapshot();
  assert_eq!(state.bookings.current.map(|b| b.status), Some(BookingStatus::Confirmed));
  assert_eq!(state.payments.current.map(|p| p.id), Some("pay-1".to_string()));
  assert!(state.payments.intent.is_none());
  assert!(h.checkpoints.load().await.unwrap().unwrap().phase.is_finished());
}

#[tokio::test]
#[serial]
async fn test_slot_outside_schedule_is_rejected_before_any_request() {
  setup_tracing();
  let transport = FakeTransport::new();
  let h = harness(transport, MockProcessor::new(), Arc::new(MemoryCheckpointStore::new())).await;

  let tuesday = ScheduleSlot::new(Day::Tuesday, hm(9, 0), hm(10, 0));
  let err = h.workflow.start(&yoga_class(), tuesday, today()).await.unwrap_err();

  assert!(matches!(err, FitbookError::Validation(_)));
  assert!(h.transport.requests().is_empty());
  assert!(h.checkpoints.load().await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_rejected_booking_halts_with_server_message_and_leaves_no_checkout() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(
    Method::Post,
    "bookings",
    400,
    json!({"errors": [{"msg": "Slot already booked"}, {"msg": "Date invalid"}]}),
  );
  script_happy_backend(&transport);
  let h = harness(transport, MockProcessor::new(), Arc::new(MemoryCheckpointStore::new())).await;

  let err = h.workflow.start(&yoga_class(), monday_slot(), today()).await.unwrap_err();

  assert_eq!(err.user_message(), "Slot already booked");
  assert!(h.checkpoints.load().await.unwrap().is_none());
  assert!(h.transport.requests_to(Method::Post, "payments/create-intent").is_empty());
  assert!(h.processor.calls().is_empty());

  let report = h.workflow.start(&yoga_class(), monday_slot(), today()).await.unwrap();

  assert!(matches!(report.checkpoint.phase, CheckoutPhase::Confirmed { .. }));
  assert_eq!(h.transport.requests_to(Method::Post, "bookings").len(), 2);
}

#[tokio::test]
#[serial]
async fn test_idle_checkpoint_does_not_block_a_new_checkout() {
  setup_tracing();
  let transport = FakeTransport::new();
  script_happy_backend(&transport);
  let h = harness(transport, MockProcessor::new(), Arc::new(MemoryCheckpointStore::new())).await;
  let stale = CheckoutCheckpoint::new("class-yoga", "Morning Yoga", monday_slot(), next_monday(), 40.0);
  h.checkpoints.save(&stale).await.unwrap();

  let report = h.workflow.start(&yoga_class(), monday_slot(), today()).await.unwrap();

  assert!(matches!(report.checkpoint.phase, CheckoutPhase::Confirmed { .. }));
  assert_ne!(report.checkpoint.id, stale.id);
}

#[tokio::test]
#[serial]
async fn test_declined_charge_keeps_intent_and_retry_reuses_it() {
  setup_tracing();
  let transport = FakeTransport::new();
  script_happy_backend(&transport);
  let processor = MockProcessor::scripted([MockCharge::Decline("Your card was declined".into())]);
  let h = harness(transport, processor, Arc::new(MemoryCheckpointStore::new())).await;

  let err = h.workflow.start(&yoga_class(), monday_slot(), today()).await.unwrap_err();
  assert_eq!(err.user_message(), "Payment was declined: Your card was declined");

  let parked = h.checkpoints.load().await.unwrap().unwrap();
  assert_eq!(parked.phase, CheckoutPhase::IntentIssued { intent_id: "pi_1".into() });
  assert_eq!(parked.charge_attempts, 1);
  assert!(parked.last_error.is_some());
  assert!(h.transport.requests_to(Method::Post, "payments/confirm").is_empty());

  // A second checkout cannot start over the parked one.
  assert!(matches!(
    h.workflow.start(&yoga_class(), monday_slot(), today()).await,
    Err(FitbookError::Validation(_))
  ));

  let report = h.workflow.retry_charge(today()).await.unwrap();

  assert!(matches!(report.checkpoint.phase, CheckoutPhase::Confirmed { .. }));
  let charges = h.processor.calls();
  assert_eq!(charges.len(), 2);
  assert!(charges.iter().all(|c| c.intent_id == "pi_1"));
  assert_eq!(h.transport.requests_to(Method::Post, "bookings").len(), 1);
  assert_eq!(h.transport.requests_to(Method::Post, "payments/create-intent").len(), 1);
}

#[tokio::test]
#[serial]
async fn test_processor_timeout_counts_as_failed_charge() {
  setup_tracing();
  let transport = FakeTransport::new();
  script_happy_backend(&transport);
  let processor = MockProcessor::scripted([MockCharge::Hang]);
  let h = harness(transport, processor, Arc::new(MemoryCheckpointStore::new())).await;

  let err = h.workflow.start(&yoga_class(), monday_slot(), today()).await.unwrap_err();

  assert!(matches!(err, FitbookError::Charge(_)));
  assert!(matches!(
    h.checkpoints.load().await.unwrap().unwrap().phase,
    CheckoutPhase::IntentIssued { .. }
  ));
}

#[tokio::test]
#[serial]
async fn test_unconfirmed_capture_is_parked_then_confirmed_on_request() {
  setup_tracing();
  let transport = FakeTransport::new();
  script_booking_and_intent(&transport);
  for _ in 0..3 {
    transport.respond(Method::Post, "payments/confirm", 500, json!({"msg": "Ledger unavailable"}));
  }
  script_confirmation(&transport);
  script_refetch(&transport);
  let h = harness(transport, MockProcessor::new(), Arc::new(MemoryCheckpointStore::new())).await;

  let err = h.workflow.start(&yoga_class(), monday_slot(), today()).await.unwrap_err();

  match err {
    FitbookError::PaymentCapturedUnconfirmed { intent_id, last_error } => {
      assert_eq!(intent_id, "pi_1");
      assert_eq!(last_error, "Ledger unavailable");
    }
    other => panic!("unexpected error: {other:?}"),
  }
  assert_eq!(h.transport.requests_to(Method::Post, "payments/confirm").len(), 3);
  let parked = h.checkpoints.load().await.unwrap().unwrap();
  assert_eq!(parked.phase, CheckoutPhase::CaptureUnconfirmed { intent_id: "pi_1".into() });

  // The captured charge cannot be walked away from silently.
  assert!(h.workflow.retry_charge(today()).await.is_err());

  let report = h.workflow.retry_confirmation(today()).await.unwrap();
  assert!(matches!(report.checkpoint.phase, CheckoutPhase::Confirmed { .. }));
  assert_eq!(h.processor.calls().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_confirmed_intent_is_never_confirmed_twice() {
  setup_tracing();
  let transport = FakeTransport::new();
  script_happy_backend(&transport);
  let h = harness(transport, MockProcessor::new(), Arc::new(MemoryCheckpointStore::new())).await;
  h.workflow.start(&yoga_class(), monday_slot(), today()).await.unwrap();

  let err = h.workflow.retry_confirmation(today()).await.unwrap_err();

  assert!(matches!(err, FitbookError::DuplicateConfirmation { ref intent_id } if intent_id == "pi_1"));
  assert_eq!(h.transport.requests_to(Method::Post, "payments/confirm").len(), 1);
}

#[tokio::test]
#[serial]
async fn test_resume_after_restart_picks_up_at_intent() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("checkout.json");
  let transport = FakeTransport::new();
  transport.respond(
    Method::Post,
    "bookings",
    201,
    booking_json("b-1", "pending", "pending", "2026-10-19"),
  );
  transport.respond(Method::Post, "payments/create-intent", 503, json!({"msg": "Try again later"}));
  transport.respond(
    Method::Post,
    "payments/create-intent",
    200,
    json!({"clientSecret": "pi_2_secret_xyz"}),
  );
  script_confirmation(&transport);
  script_refetch(&transport);

  let first = harness(transport.clone(), MockProcessor::new(), Arc::new(FileCheckpointStore::new(&path))).await;
  let err = first.workflow.start(&yoga_class(), monday_slot(), today()).await.unwrap_err();
  assert_eq!(err.user_message(), "Try again later");
  drop(first);

  let second = harness(transport.clone(), MockProcessor::new(), Arc::new(FileCheckpointStore::new(&path))).await;
  let stored = second.workflow.status().await.unwrap().unwrap();
  assert_eq!(stored.phase, CheckoutPhase::BookingCreated { booking_id: "b-1".into() });

  let report = second.workflow.resume(today()).await.unwrap();

  assert!(matches!(report.checkpoint.phase, CheckoutPhase::Confirmed { .. }));
  assert_eq!(second.processor.calls()[0].intent_id, "pi_2");
  assert_eq!(transport.requests_to(Method::Post, "bookings").len(), 1);

  second.workflow.clear().await.unwrap();
  assert!(!path.exists());
}

#[tokio::test]
#[serial]
async fn test_abort_cancels_unpaid_booking() {
  setup_tracing();
  let transport = FakeTransport::new();
  script_booking_and_intent(&transport);
  transport.respond(
    Method::Put,
    "bookings/b-1",
    200,
    booking_json("b-1", "cancelled", "pending", "2026-10-19"),
  );
  let processor = MockProcessor::scripted([MockCharge::Decline("Insufficient funds".into())]);
  let h = harness(transport, processor, Arc::new(MemoryCheckpointStore::new())).await;
  let _ = h.workflow.start(&yoga_class(), monday_slot(), today()).await;

  let aborted = h.workflow.abort(today(), "Changed my mind").await.unwrap();

  assert_eq!(
    aborted.phase,
    CheckoutPhase::Aborted {
      reason: "Changed my mind".into(),
      captured_intent: None,
    }
  );
  let put = &h.transport.requests_to(Method::Put, "bookings/b-1")[0];
  assert_eq!(put.body.as_ref().unwrap()["status"], "cancelled");
  assert!(h.store.snapshot().payments.intent.is_none());
  assert!(matches!(h.workflow.resume(today()).await, Err(FitbookError::NoCheckoutInProgress)));
}

#[tokio::test]
#[serial]
async fn test_aborted_checkout_without_capture_is_never_confirmed() {
  setup_tracing();
  let transport = FakeTransport::new();
  script_happy_backend(&transport);
  transport.respond(
    Method::Put,
    "bookings/b-1",
    200,
    booking_json("b-1", "cancelled", "pending", "2026-10-19"),
  );
  let processor = MockProcessor::scripted([MockCharge::Decline("Your card was declined".into())]);
  let h = harness(transport, processor, Arc::new(MemoryCheckpointStore::new())).await;
  let _ = h.workflow.start(&yoga_class(), monday_slot(), today()).await;
  h.workflow.abort(today(), "Card declined").await.unwrap();

  let err = h.workflow.retry_confirmation(today()).await.unwrap_err();

  assert!(matches!(err, FitbookError::Validation(_)));
  assert!(h.transport.requests_to(Method::Post, "payments/confirm").is_empty());
  assert!(matches!(
    h.checkpoints.load().await.unwrap().unwrap().phase,
    CheckoutPhase::Aborted { captured_intent: None, .. }
  ));
}

#[tokio::test]
#[serial]
async fn test_abandoned_unconfirmed_capture_can_still_be_confirmed() {
  setup_tracing();
  let transport = FakeTransport::new();
  script_booking_and_intent(&transport);
  for _ in 0..3 {
    transport.respond(Method::Post, "payments/confirm", 500, json!({"msg": "Ledger unavailable"}));
  }
  script_confirmation(&transport);
  script_refetch(&transport);
  let h = harness(transport, MockProcessor::new(), Arc::new(MemoryCheckpointStore::new())).await;
  let _ = h.workflow.start(&yoga_class(), monday_slot(), today()).await;

  let aborted = h.workflow.abort(today(), "Gave up waiting").await.unwrap();
  assert_eq!(
    aborted.phase,
    CheckoutPhase::Aborted {
      reason: "Gave up waiting".into(),
      captured_intent: Some("pi_1".into()),
    }
  );
  // The paid booking is left alone.
  assert!(h.transport.requests_to(Method::Put, "bookings/b-1").is_empty());

  let report = h.workflow.retry_confirmation(today()).await.unwrap();

  assert!(matches!(report.checkpoint.phase, CheckoutPhase::Confirmed { .. }));
  assert_eq!(h.transport.requests_to(Method::Post, "payments/confirm").len(), 4);
  assert_eq!(h.processor.calls().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_expired_session_stops_checkout_and_requires_login() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(Method::Post, "bookings", 401, json!({"msg": "Token is not valid"}));
  let h = harness(transport, MockProcessor::new(), Arc::new(MemoryCheckpointStore::new())).await;

  let err = h.workflow.start(&yoga_class(), monday_slot(), today()).await.unwrap_err();

  assert!(err.is_unauthorized());
  assert!(h.session.login_required());
  assert!(h.processor.calls().is_empty());
}

#[tokio::test]
#[serial]
async fn test_refund_only_for_completed_payments() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(Method::Get, "payments/pay-1", 200, payment_json("pay-1", "completed", "b-1"));
  transport.respond(Method::Get, "payments/pay-2", 200, payment_json("pay-2", "refunded", "b-2"));
  transport.respond(Method::Post, "payments/refund", 200, json!({"msg": "Refund processed"}));
  let h = harness(transport, MockProcessor::new(), Arc::new(MemoryCheckpointStore::new())).await;

  let receipt = h.workflow.refund("pay-1", None).await.unwrap();
  assert_eq!(receipt.message.as_deref(), Some("Refund processed"));

  assert!(matches!(h.workflow.refund("pay-2", None).await, Err(FitbookError::Validation(_))));
  assert_eq!(h.transport.requests_to(Method::Post, "payments/refund").len(), 1);
  assert!(h
    .transport
    .requests()
    .iter()
    .all(|r| !(r.method == Method::Put && r.path.starts_with("bookings"))));
}
