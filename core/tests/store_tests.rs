// tests/store_tests.rs

mod common;

use common::*;
use fitbook::api::Method;
use fitbook::error::FitbookError;
use fitbook::model::{Booking, BookingQuery, BookingStatus, Payment, PaymentRecordStatus, ReviewDraft, Role};
use fitbook::store::{Dispatcher, Store};
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;

async fn dispatcher(transport: Arc<FakeTransport>, role: Role) -> Dispatcher {
  let (client, _session) = signed_in(transport, role).await;
  let dispatcher = Dispatcher::new(client, Store::new());
  dispatcher.restore_session().await.unwrap();
  dispatcher
}

fn booking(id: &str, status: &str, date: &str) -> Booking {
  serde_json::from_value(booking_json(id, status, "pending", date)).unwrap()
}

#[tokio::test]
#[serial]
async fn test_list_fills_slice_and_failure_sets_banner() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(
    Method::Get,
    "bookings",
    200,
    json!([
      booking_json("b-1", "confirmed", "paid", "2026-10-19"),
      booking_json("b-2", "cancelled", "pending", "2026-10-12")
    ]),
  );
  let dispatcher = dispatcher(transport.clone(), Role::Client).await;

  dispatcher.load_bookings(&BookingQuery::default()).await.unwrap();
  {
    let bookings = dispatcher.store().select(|s| &s.bookings);
    assert_eq!(bookings.bookings.len(), 2);
    assert!(bookings.status.is_success);
    assert!(!bookings.status.is_loading);
  }

  transport.respond(Method::Get, "bookings/b-9", 404, json!({"msg": "Booking not found"}));
  let err = dispatcher.load_booking("b-9").await.unwrap_err();
  assert_eq!(err.user_message(), "Booking not found");
  let status = dispatcher.store().snapshot().bookings.status;
  assert!(status.is_error);
  assert_eq!(status.message, "Booking not found");
}

#[tokio::test]
#[serial]
async fn test_cancel_is_rejected_locally_for_today_or_past() {
  setup_tracing();
  let transport = FakeTransport::new();
  let dispatcher = dispatcher(transport.clone(), Role::Client).await;

  let same_day = booking("b-1", "confirmed", "2026-10-14");
  let err = dispatcher.cancel_booking(&same_day, today()).await.unwrap_err();
  assert!(matches!(err, FitbookError::CancellationNotAllowed(_)));
  assert!(transport.requests_to(Method::Put, "bookings/b-1").is_empty());
  assert!(dispatcher.store().snapshot().bookings.status.is_error);

  let completed = booking("b-2", "completed", "2026-10-20");
  assert!(matches!(
    dispatcher.cancel_booking(&completed, today()).await,
    Err(FitbookError::InvalidTransition { .. })
  ));
}

#[tokio::test]
#[serial]
async fn test_cancel_replaces_booking_in_slice() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(
    Method::Get,
    "bookings",
    200,
    json!([booking_json("b-1", "confirmed", "paid", "2026-10-19")]),
  );
  transport.respond(
    Method::Put,
    "bookings/b-1",
    200,
    booking_json("b-1", "cancelled", "paid", "2026-10-19"),
  );
  let dispatcher = dispatcher(transport.clone(), Role::Client).await;
  let listed = dispatcher.load_bookings(&BookingQuery::default()).await.unwrap();

  dispatcher.cancel_booking(&listed[0], today()).await.unwrap();

  let put = &transport.requests_to(Method::Put, "bookings/b-1")[0];
  assert_eq!(put.body.as_ref().unwrap()["status"], "cancelled");
  assert_eq!(dispatcher.store().snapshot().bookings.bookings[0].status, BookingStatus::Cancelled);
}

#[tokio::test]
#[serial]
async fn test_trainer_transitions_follow_lifecycle() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(
    Method::Put,
    "bookings/trainer/b-1",
    200,
    booking_json("b-1", "confirmed", "pending", "2026-10-19"),
  );
  let trainer = dispatcher(transport.clone(), Role::Trainer).await;

  let pending = booking("b-1", "pending", "2026-10-19");
  let updated = trainer.update_booking_status(&pending, BookingStatus::Confirmed).await.unwrap();
  assert_eq!(updated.status, BookingStatus::Confirmed);

  let err = trainer
    .update_booking_status(&pending, BookingStatus::Completed)
    .await
    .unwrap_err();
  assert!(matches!(err, FitbookError::InvalidTransition { .. }));
  assert_eq!(transport.requests_to(Method::Put, "bookings/trainer/b-1").len(), 1);

  let client = dispatcher(FakeTransport::new(), Role::Client).await;
  assert!(matches!(
    client.update_booking_status(&pending, BookingStatus::Confirmed).await,
    Err(FitbookError::Forbidden { .. })
  ));
}

#[tokio::test]
#[serial]
async fn test_401_marks_session_expired_in_store() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(Method::Get, "payments/history", 401, json!({"msg": "Token is not valid"}));
  let dispatcher = dispatcher(transport, Role::Client).await;
  assert!(dispatcher.store().snapshot().auth.user.is_some());

  let err = dispatcher.load_payment_history().await.unwrap_err();

  assert!(err.is_unauthorized());
  let auth = dispatcher.store().snapshot().auth;
  assert!(auth.user.is_none());
  assert!(auth.session_expired);
  assert!(dispatcher.client().session().login_required());
}

#[tokio::test]
#[serial]
async fn test_refund_marks_payment_but_leaves_booking_alone() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(
    Method::Get,
    "payments/history",
    200,
    json!([payment_json("pay-1", "completed", "b-1"), payment_json("pay-2", "pending", "b-2")]),
  );
  transport.respond(
    Method::Get,
    "bookings",
    200,
    json!([booking_json("b-1", "confirmed", "paid", "2026-10-19")]),
  );
  transport.respond(Method::Post, "payments/refund", 200, json!({"msg": "Refund processed"}));
  let dispatcher = dispatcher(transport.clone(), Role::Client).await;
  dispatcher.load_bookings(&BookingQuery::default()).await.unwrap();
  let payments: Vec<Payment> = dispatcher.load_payment_history().await.unwrap();

  let err = dispatcher.refund_payment(&payments[1], None).await.unwrap_err();
  assert!(matches!(err, FitbookError::Validation(_)));

  dispatcher.refund_payment(&payments[0], Some("Schedule clash")).await.unwrap();

  let state = dispatcher.store().snapshot();
  assert_eq!(state.payments.payments[0].status, PaymentRecordStatus::Refunded);
  assert_eq!(state.payments.payments[1].status, PaymentRecordStatus::Pending);
  assert_eq!(state.bookings.bookings[0].status, BookingStatus::Confirmed);
  assert!(transport.requests_to(Method::Put, "bookings/b-1").is_empty());
  assert_eq!(transport.requests_to(Method::Post, "payments/refund").len(), 1);
}

#[tokio::test]
#[serial]
async fn test_review_guards_run_before_request() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(
    Method::Post,
    "trainers/trainer-1/reviews",
    200,
    json!({"_id": "r-1", "trainerId": "trainer-1", "clientName": "Casey Client", "rating": 5, "comment": "Great"}),
  );
  let dispatcher = dispatcher(transport.clone(), Role::Client).await;

  let err = dispatcher
    .add_review("trainer-1", &ReviewDraft::new(0, "Great"))
    .await
    .unwrap_err();
  assert_eq!(err.user_message(), "Please select a rating");
  assert_eq!(dispatcher.store().snapshot().trainers.status.message, "Please select a rating");

  let err = dispatcher
    .add_review("user-client", &ReviewDraft::new(5, "Me"))
    .await
    .unwrap_err();
  assert_eq!(err.user_message(), "You cannot review yourself");
  assert!(transport.requests().is_empty());

  dispatcher
    .add_review("trainer-1", &ReviewDraft::new(5, "Great"))
    .await
    .unwrap();
  assert_eq!(dispatcher.store().snapshot().trainers.reviews.len(), 1);
}
