// fitbook/src/lib.rs

//! Fitbook: a typed client for a fitness-class booking service.
//!
//! The crate covers what a front-end needs besides drawing:
//!  - Wire types for classes, trainers, bookings, payments and profiles.
//!  - An explicit session context, persisted between runs and torn down on 401.
//!  - A REST client over a pluggable transport.
//!  - A unidirectional store of resource slices plus the async actions that
//!    feed it.
//!  - The booking → payment → confirmation checkout as a resumable workflow,
//!    built on a small async step engine.
//!  - Pure list filtering and sorting for the views.

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod flow;
pub mod listing;
pub mod model;
pub mod session;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::api::{ApiClient, HttpTransport, Transport};
pub use crate::checkout::{CheckoutPhase, CheckoutWorkflow, MockProcessor, PaymentProcessor};
pub use crate::config::ClientConfig;
pub use crate::error::{ApiError, FitbookError, Result};
pub use crate::session::{FileSessionStore, MemorySessionStore, Session, SessionContext, SessionState};
pub use crate::store::{Action, Dispatcher, Store};

/*
    Typical wiring:
    1. `ClientConfig::from_env()`.
    2. `SessionContext::new(Arc::new(FileSessionStore::new(&config.session_file)))`, then `restore()`.
    3. `ApiClient::http(&config, session.clone())`.
    4. `Dispatcher::new(client.clone(), Store::new())` for list/detail screens.
    5. `CheckoutWorkflow::builder(client, processor).configured(&config).store(store).build()`
       for booking a class.
*/
