// fitbook/src/checkout/mod.rs

//! Booking → payment → confirmation as an explicit, resumable workflow.

mod checkpoint;
mod pipeline;
mod processor;
mod retry;
mod state;
mod workflow;

pub use checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
pub use processor::{ChargeReceipt, ChargeRequest, MockCharge, MockProcessor, PaymentProcessor};
pub use retry::RetryPolicy;
pub use state::{CheckoutCheckpoint, CheckoutPhase};
pub use workflow::{CheckoutBuilder, CheckoutReport, CheckoutWorkflow};
