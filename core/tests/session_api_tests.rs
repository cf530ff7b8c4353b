// tests/session_api_tests.rs

mod common;

use common::*;
use fitbook::api::{ApiClient, Method};
use fitbook::error::{ApiError, FitbookError};
use fitbook::model::{BookingQuery, BookingStatus, Registration, Role};
use fitbook::session::{FileSessionStore, SessionContext, SessionState, SignOutReason};
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_token_is_attached_to_every_request() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(Method::Get, "bookings", 200, json!([]));
  let (client, _session) = signed_in(transport.clone(), Role::Client).await;

  client
    .list_bookings(&BookingQuery {
      status: Some(BookingStatus::Confirmed),
      upcoming: Some(true),
    })
    .await
    .unwrap();

  let sent = transport.requests_to(Method::Get, "bookings");
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].token.as_deref(), Some(TOKEN));
  assert!(sent[0].query.contains(&("status".to_string(), "confirmed".to_string())));
}

#[tokio::test]
#[serial]
async fn test_401_tears_session_down_and_requires_login() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(Method::Get, "bookings", 401, json!({"msg": "Token is not valid"}));
  let (client, session) = signed_in(transport.clone(), Role::Client).await;
  assert!(!session.login_required());

  let err = client.list_bookings(&BookingQuery::default()).await.unwrap_err();

  assert!(err.is_unauthorized());
  assert!(session.login_required());
  assert_eq!(
    session.state(),
    SessionState::SignedOut {
      reason: SignOutReason::Unauthorized
    }
  );

  // The next call goes out without a credential.
  let _ = client.list_bookings(&BookingQuery::default()).await;
  let sent = transport.requests_to(Method::Get, "bookings");
  assert_eq!(sent.last().and_then(|r| r.token.clone()), None);
}

#[tokio::test]
#[serial]
async fn test_error_bodies_become_banner_messages() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(
    Method::Post,
    "bookings",
    400,
    json!({"errors": [{"msg": "Class is full"}, {"msg": "Date is required"}]}),
  );
  transport.respond(Method::Get, "bookings/b-404", 404, json!({"msg": "Booking not found"}));
  transport.respond(Method::Get, "payments/history", 500, json!({"message": "Stripe unavailable"}));
  transport.fail(Method::Get, "classes", ApiError::Network("connection refused".into()));
  let (client, _session) = signed_in(transport.clone(), Role::Client).await;

  let booking = fitbook::model::NewBooking {
    class_id: "class-yoga".into(),
    date: next_monday(),
    start_time: hm(9, 0),
    end_time: hm(10, 0),
  };
  assert_eq!(client.create_booking(&booking).await.unwrap_err().user_message(), "Class is full");
  assert_eq!(client.get_booking("b-404").await.unwrap_err().user_message(), "Booking not found");
  assert_eq!(client.payment_history().await.unwrap_err().user_message(), "Stripe unavailable");
  assert_eq!(
    client
      .list_classes(&Default::default())
      .await
      .unwrap_err()
      .user_message(),
    fitbook::error::GENERIC_ERROR_MESSAGE
  );
}

#[tokio::test]
#[serial]
async fn test_login_persists_session_to_file_and_restores_it() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("session.json");
  let transport = FakeTransport::new();
  transport.respond(
    Method::Post,
    "auth/login",
    200,
    json!({"token": TOKEN, "user": {"_id": "user-client", "name": "Casey Client", "email": "casey@example.com", "userType": "client"}}),
  );

  let session = SessionContext::new(Arc::new(FileSessionStore::new(&path)));
  let client = ApiClient::new(transport.clone(), session.clone());
  let user = client.login("casey@example.com", "hunter22!").await.unwrap();
  assert_eq!(user.role, Role::Client);
  assert!(path.exists());

  // A fresh process picks the stored session up.
  let reopened = SessionContext::new(Arc::new(FileSessionStore::new(&path)));
  assert_eq!(reopened.restore().await.unwrap(), SessionState::SignedIn(user));
  assert_eq!(reopened.token().as_deref(), Some(TOKEN));

  reopened.logout().await.unwrap();
  assert!(!path.exists());
  assert_eq!(
    reopened.state(),
    SessionState::SignedOut {
      reason: SignOutReason::LoggedOut
    }
  );
}

#[tokio::test]
#[serial]
async fn test_corrupt_session_file_counts_as_signed_out() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("session.json");
  std::fs::write(&path, "{not json").unwrap();

  let session = SessionContext::new(Arc::new(FileSessionStore::new(&path)));
  assert_eq!(
    session.restore().await.unwrap(),
    SessionState::SignedOut {
      reason: SignOutReason::NoSession
    }
  );
}

#[tokio::test]
#[serial]
async fn test_register_without_user_fetches_me_with_new_token() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(Method::Post, "auth/register", 200, json!({"token": "fresh-token"}));
  transport.respond(
    Method::Get,
    "auth/me",
    200,
    json!({"_id": "trainer-9", "name": "Riley", "email": "riley@example.com", "userType": "trainer"}),
  );
  let (client, session) = signed_out(transport.clone());

  let registration = Registration {
    name: "Riley".into(),
    email: "riley@example.com".into(),
    password: "longenough".into(),
    password_confirmation: "longenough".into(),
    role: Role::Trainer,
  };
  let user = client.register(&registration).await.unwrap();

  assert!(user.is_trainer());
  let register = &transport.requests_to(Method::Post, "auth/register")[0];
  let body = register.body.as_ref().unwrap();
  assert_eq!(body["userType"], "trainer");
  assert!(body.get("password_confirmation").is_none());
  assert_eq!(transport.requests_to(Method::Get, "auth/me")[0].token.as_deref(), Some("fresh-token"));
  assert_eq!(session.token().as_deref(), Some("fresh-token"));
}

#[tokio::test]
#[serial]
async fn test_trainer_cancel_sends_note_and_refund_uses_default_reason() {
  setup_tracing();
  let transport = FakeTransport::new();
  transport.respond(
    Method::Put,
    "bookings/trainer/b-1",
    200,
    booking_json("b-1", "cancelled", "pending", "2026-10-19"),
  );
  transport.respond(
    Method::Post,
    "payments/refund",
    200,
    json!({"msg": "Refund processed", "refundId": "re_1"}),
  );
  let (client, _session) = signed_in(transport.clone(), Role::Trainer).await;

  client.update_booking_status("b-1", BookingStatus::Cancelled).await.unwrap();
  let put = &transport.requests_to(Method::Put, "bookings/trainer/b-1")[0];
  assert_eq!(put.body.as_ref().unwrap()["notes"], "Cancelled by trainer");

  let receipt = client.refund_payment("pay-1", Some("  ")).await.unwrap();
  assert_eq!(receipt.payment_id, "pay-1");
  assert_eq!(receipt.refund_id.as_deref(), Some("re_1"));
  let refund = &transport.requests_to(Method::Post, "payments/refund")[0];
  assert_eq!(refund.body.as_ref().unwrap()["reason"], "Customer requested refund");
}

#[tokio::test]
#[serial]
async fn test_role_guards_on_session() {
  setup_tracing();
  let (_client, session) = signed_in(FakeTransport::new(), Role::Client).await;
  assert!(session.require_role(Role::Client).is_ok());
  assert!(matches!(
    session.require_role(Role::Trainer),
    Err(FitbookError::Forbidden { required: Role::Trainer })
  ));

  let (_client, anonymous) = signed_out(FakeTransport::new());
  assert!(matches!(anonymous.require_user(), Err(FitbookError::NotAuthenticated)));
}
