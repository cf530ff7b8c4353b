// fitbook/src/api/mod.rs

//! REST client for the booking backend.
//!
//! [`ApiClient`] owns a [`Transport`] and the [`SessionContext`](crate::session::SessionContext);
//! endpoint groups live in their own modules as `impl ApiClient` blocks. The
//! methods here are thin: they shape requests and decode responses. Client-side
//! guards (role checks, form validation, cancellation rules) run one layer up in
//! the store dispatcher and the checkout workflow.

mod auth;
mod bookings;
mod classes;
pub mod client;
mod payments;
mod profile;
mod trainers;
pub mod transport;

pub use auth::AuthResponse;
pub use client::ApiClient;
pub use payments::RefundReceipt;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

/// Refund reason sent when the caller gives none.
pub const DEFAULT_REFUND_REASON: &str = "Customer requested refund";

/// Notes attached to a trainer-side cancellation.
pub const TRAINER_CANCEL_NOTE: &str = "Cancelled by trainer";
