// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use fitbook::api::{ApiClient, ApiRequest, ApiResponse, Method, Transport};
use fitbook::error::ApiError;
use fitbook::model::{ClassOffering, Day, Role, ScheduleSlot, User};
use fitbook::session::{MemorySessionStore, Session, SessionContext};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::Level;

// --- Tracing ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Scripted transport ---

type Scripted = std::result::Result<ApiResponse, ApiError>;

/// Answers by `(method, path)`. Queued answers are consumed in order; the last
/// one keeps answering. Unscripted routes get a 404.
#[derive(Debug, Default)]
pub struct FakeTransport {
  routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
  requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
    self.push(method, path, Ok(ApiResponse::new(status, body)));
  }

  pub fn fail(&self, method: Method, path: &str, error: ApiError) {
    self.push(method, path, Err(error));
  }

  fn push(&self, method: Method, path: &str, answer: Scripted) {
    self
      .routes
      .lock()
      .entry((method, path.to_string()))
      .or_default()
      .push_back(answer);
  }

  pub fn requests(&self) -> Vec<ApiRequest> {
    self.requests.lock().clone()
  }

  pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
    self
      .requests()
      .into_iter()
      .filter(|r| r.method == method && r.path == path)
      .collect()
  }
}

#[async_trait]
impl Transport for FakeTransport {
  async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, ApiError> {
    let key = (request.method, request.path.clone());
    self.requests.lock().push(request);
    let mut routes = self.routes.lock();
    match routes.get_mut(&key) {
      Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(|| Ok(not_found())),
      Some(queue) => queue.front().cloned().unwrap_or_else(|| Ok(not_found())),
      None => Ok(not_found()),
    }
  }
}

fn not_found() -> ApiResponse {
  ApiResponse::new(404, json!({"msg": "Route not scripted"}))
}

// --- Fixtures ---

pub const TOKEN: &str = "test-token-abc";

/// A Wednesday.
pub fn today() -> NaiveDate {
  NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

pub fn next_monday() -> NaiveDate {
  NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
  NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn monday_slot() -> ScheduleSlot {
  ScheduleSlot::new(Day::Monday, hm(9, 0), hm(10, 0))
}

pub fn yoga_class() -> ClassOffering {
  serde_json::from_value(yoga_class_json()).unwrap()
}

pub fn yoga_class_json() -> Value {
  json!({
    "_id": "class-yoga",
    "title": "Morning Yoga",
    "description": "Gentle flow",
    "type": "Yoga",
    "duration": 60,
    "price": 40,
    "location": "Studio A",
    "schedule": [
      {"day": "Monday", "startTime": "09:00", "endTime": "10:00"},
      {"day": "Thursday", "startTime": "18:00", "endTime": "19:00"}
    ],
    "trainer": {"_id": "trainer-1", "name": "Sam", "profile": {"rating": 4.8}}
  })
}

pub fn booking_json(id: &str, status: &str, payment_status: &str, date: &str) -> Value {
  json!({
    "_id": id,
    "class": {"_id": "class-yoga", "title": "Morning Yoga", "price": 40},
    "client": "user-client",
    "trainer": "trainer-1",
    "date": date,
    "startTime": "09:00",
    "endTime": "10:00",
    "status": status,
    "paymentStatus": payment_status
  })
}

pub fn payment_json(id: &str, status: &str, booking_id: &str) -> Value {
  json!({
    "_id": id,
    "amount": 40,
    "status": status,
    "booking": booking_id,
    "paymentMethod": "card",
    "transactionId": "pi_test_1"
  })
}

pub fn user(role: Role) -> User {
  match role {
    Role::Client => User {
      id: "user-client".into(),
      name: "Casey Client".into(),
      email: "casey@example.com".into(),
      role,
    },
    Role::Trainer => User {
      id: "trainer-1".into(),
      name: "Sam".into(),
      email: "sam@example.com".into(),
      role,
    },
  }
}

pub fn session_for(role: Role) -> Session {
  Session {
    token: TOKEN.into(),
    user: user(role),
  }
}

/// Client plus the session it reports to, signed in as `role`.
pub async fn signed_in(transport: Arc<FakeTransport>, role: Role) -> (ApiClient, SessionContext) {
  let session = SessionContext::new(Arc::new(MemorySessionStore::with_session(session_for(role))));
  session.restore().await.unwrap();
  (ApiClient::new(transport, session.clone()), session)
}

pub fn signed_out(transport: Arc<FakeTransport>) -> (ApiClient, SessionContext) {
  let session = SessionContext::in_memory();
  (ApiClient::new(transport, session.clone()), session)
}
